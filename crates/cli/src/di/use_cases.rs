use super::{DnsServices, Repositories};
use homedns_api::AppState;
use homedns_application::services::jwt::VerifierSettings;
use homedns_application::services::TokenVerifier;
use homedns_application::use_cases::{
    AddCredentialUseCase, CreateRecordUseCase, DeleteRecordUseCase, GetRecordsUseCase,
    ListCredentialsUseCase, RecordPolicy, RemoveCredentialUseCase, UpdateRecordUseCase,
    UpsertRecordUseCase,
};
use homedns_domain::Config;
use std::sync::Arc;

pub struct UseCases {
    pub get_records: Arc<GetRecordsUseCase>,
    pub create_record: Arc<CreateRecordUseCase>,
    pub update_record: Arc<UpdateRecordUseCase>,
    pub upsert_record: Arc<UpsertRecordUseCase>,
    pub delete_record: Arc<DeleteRecordUseCase>,
    pub list_credentials: Arc<ListCredentialsUseCase>,
    pub add_credential: Arc<AddCredentialUseCase>,
    pub remove_credential: Arc<RemoveCredentialUseCase>,
}

impl UseCases {
    pub fn new(config: &Config, repos: &Repositories, dns: &DnsServices) -> Self {
        let policy = RecordPolicy::from_config(&config.dns);
        let invalidator = dns.cache_invalidator();

        Self {
            get_records: Arc::new(GetRecordsUseCase::new(repos.records.clone())),
            create_record: Arc::new(CreateRecordUseCase::new(
                repos.records.clone(),
                invalidator.clone(),
                policy,
            )),
            update_record: Arc::new(UpdateRecordUseCase::new(
                repos.records.clone(),
                invalidator.clone(),
                policy,
            )),
            upsert_record: Arc::new(UpsertRecordUseCase::new(
                repos.records.clone(),
                invalidator.clone(),
                policy,
            )),
            delete_record: Arc::new(DeleteRecordUseCase::new(repos.records.clone(), invalidator)),
            list_credentials: Arc::new(ListCredentialsUseCase::new(repos.registry.clone())),
            add_credential: Arc::new(AddCredentialUseCase::new(repos.registry.clone())),
            remove_credential: Arc::new(RemoveCredentialUseCase::new(repos.registry.clone())),
        }
    }

    pub fn into_app_state(self, config: &Config, repos: &Repositories, dns: &DnsServices) -> AppState {
        let verifier = config.jwt.enabled.then(|| {
            Arc::new(TokenVerifier::new(
                repos.registry.clone(),
                VerifierSettings::from(&config.jwt),
            ))
        });

        AppState {
            get_records: self.get_records,
            create_record: self.create_record,
            update_record: self.update_record,
            upsert_record: self.upsert_record,
            delete_record: self.delete_record,
            list_credentials: self.list_credentials,
            add_credential: self.add_credential,
            remove_credential: self.remove_credential,
            verifier,
            cache: dns.cache.clone(),
            engine: dns.engine.clone(),
        }
    }
}
