use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use homedns_api::{create_api_routes, AppState};
use homedns_application::ports::CacheInvalidator;
use homedns_application::services::jwt::VerifierSettings;
use homedns_application::services::{TokenSigner, TokenVerifier};
use homedns_application::use_cases::{
    AddCredentialUseCase, CreateRecordUseCase, DeleteRecordUseCase, GetRecordsUseCase,
    ListCredentialsUseCase, RecordPolicy, RemoveCredentialUseCase, UpdateRecordUseCase,
    UpsertRecordUseCase,
};
use homedns_domain::config::JwtConfig;
use homedns_domain::{InvocationContext, SigningAlgorithm};
use homedns_infrastructure::database::{create_memory_pool, run_migrations};
use homedns_infrastructure::dns::{DnsCache, QueryEngine};
use homedns_infrastructure::registry::JsonCredentialRegistry;
use homedns_infrastructure::repositories::SqliteRecordRepository;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    pub router: Router,
    pub cache: Arc<DnsCache>,
    pub registry: Arc<JsonCredentialRegistry>,
    pub jwt: JwtConfig,
    add_credential: AddCredentialUseCase,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(true).await
    }

    pub async fn without_auth() -> Self {
        Self::build(false).await
    }

    async fn build(jwt_enabled: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();

        let records = Arc::new(SqliteRecordRepository::new(pool));
        let registry = Arc::new(
            JsonCredentialRegistry::open(dir.path().join("jwt_subjects.json"))
                .await
                .unwrap(),
        );
        let cache = Arc::new(DnsCache::new(0));
        let invalidator: Arc<dyn CacheInvalidator> = cache.clone();
        let policy = RecordPolicy::default();

        let jwt = JwtConfig {
            enabled: jwt_enabled,
            ..JwtConfig::default()
        };
        let verifier = jwt.enabled.then(|| {
            Arc::new(TokenVerifier::new(
                registry.clone(),
                VerifierSettings::from(&jwt),
            ))
        });

        let engine = Arc::new(QueryEngine::new(records.clone(), Vec::new()).with_cache(cache.clone()));

        let state = AppState {
            get_records: Arc::new(GetRecordsUseCase::new(records.clone())),
            create_record: Arc::new(CreateRecordUseCase::new(
                records.clone(),
                invalidator.clone(),
                policy,
            )),
            update_record: Arc::new(UpdateRecordUseCase::new(
                records.clone(),
                invalidator.clone(),
                policy,
            )),
            upsert_record: Arc::new(UpsertRecordUseCase::new(
                records.clone(),
                invalidator.clone(),
                policy,
            )),
            delete_record: Arc::new(DeleteRecordUseCase::new(records.clone(), invalidator)),
            list_credentials: Arc::new(ListCredentialsUseCase::new(registry.clone())),
            add_credential: Arc::new(AddCredentialUseCase::new(registry.clone())),
            remove_credential: Arc::new(RemoveCredentialUseCase::new(registry.clone())),
            verifier,
            cache: Some(cache.clone()),
            engine,
        };

        Self {
            router: create_api_routes(state),
            cache,
            add_credential: AddCredentialUseCase::new(registry.clone()),
            registry,
            jwt,
            _dir: dir,
        }
    }

    /// Registers a subject the way the local CLI does and returns a token
    /// for it, valid for an hour.
    pub async fn issue_token(&self) -> (Uuid, String) {
        self.issue_token_at(Utc::now(), Duration::hours(1)).await
    }

    pub async fn issue_token_at(&self, now: chrono::DateTime<Utc>, lifetime: Duration) -> (Uuid, String) {
        let issued = self
            .add_credential
            .execute(InvocationContext::Local, SigningAlgorithm::Es256)
            .await
            .unwrap();
        let signer = TokenSigner::from_pem(&issued.private_key_pem).unwrap();
        let token = signer
            .issue(
                issued.subject_id,
                &self.jwt.issuer,
                &self.jwt.audience,
                now,
                lifetime,
            )
            .unwrap();
        (issued.subject_id, token)
    }

    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(method, uri, token, body).await;
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}
