use homedns_application::services::TokenVerifier;
use homedns_application::use_cases::{
    AddCredentialUseCase, CreateRecordUseCase, DeleteRecordUseCase, GetRecordsUseCase,
    ListCredentialsUseCase, RemoveCredentialUseCase, UpdateRecordUseCase, UpsertRecordUseCase,
};
use homedns_infrastructure::dns::{DnsCache, QueryEngine};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub get_records: Arc<GetRecordsUseCase>,
    pub create_record: Arc<CreateRecordUseCase>,
    pub update_record: Arc<UpdateRecordUseCase>,
    pub upsert_record: Arc<UpsertRecordUseCase>,
    pub delete_record: Arc<DeleteRecordUseCase>,
    pub list_credentials: Arc<ListCredentialsUseCase>,
    pub add_credential: Arc<AddCredentialUseCase>,
    pub remove_credential: Arc<RemoveCredentialUseCase>,
    /// `None` when token verification is switched off
    pub verifier: Option<Arc<TokenVerifier>>,
    /// `None` when the resolution cache is disabled
    pub cache: Option<Arc<DnsCache>>,
    pub engine: Arc<QueryEngine>,
}
