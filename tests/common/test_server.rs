use super::TestClient;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration as ChronoDuration, Utc};
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
use homedns_domain::{ForwardTarget, InvocationContext, SigningAlgorithm};
use homedns_infrastructure::database::{create_memory_pool, run_migrations};
use homedns_infrastructure::dns::{DnsCache, DnsServer, Forwarder, QueryEngine};
use homedns_infrastructure::registry::JsonCredentialRegistry;
use homedns_infrastructure::repositories::SqliteRecordRepository;
use http_body_util::BodyExt;
use serde_json::Value;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::{TcpListener, UdpSocket};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use uuid::Uuid;

/// The full stack on loopback: record store, registry, cache, forwarder,
/// DNS listeners and the control API router.
pub struct TestServer {
    udp_addr: SocketAddr,
    tcp_addr: SocketAddr,
    router: Router,
    pub cache: Arc<DnsCache>,
    pub engine: Arc<QueryEngine>,
    pub registry: Arc<JsonCredentialRegistry>,
    pub jwt: JwtConfig,
    add_credential: AddCredentialUseCase,
    cancel: CancellationToken,
    dir: TempDir,
}

pub struct TestServerBuilder {
    authoritative_domains: Vec<String>,
    upstreams: Vec<SocketAddr>,
    timeouts: Vec<Duration>,
}

impl TestServerBuilder {
    pub fn new() -> Self {
        Self {
            authoritative_domains: vec![super::TestDomains::zone().to_string()],
            upstreams: Vec::new(),
            timeouts: vec![Duration::from_millis(200), Duration::from_millis(400)],
        }
    }

    pub fn with_upstream(mut self, addr: SocketAddr) -> Self {
        self.upstreams.push(addr);
        self
    }

    pub fn with_timeouts(mut self, timeouts: Vec<Duration>) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub async fn start(self) -> TestServer {
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

        let mut engine =
            QueryEngine::new(records.clone(), self.authoritative_domains).with_cache(cache.clone());
        if !self.upstreams.is_empty() {
            let targets: Vec<ForwardTarget> =
                self.upstreams.into_iter().map(ForwardTarget::new).collect();
            engine = engine.with_forwarder(Arc::new(Forwarder::new(&targets, self.timeouts)));
        }
        let engine = Arc::new(engine);

        let cancel = CancellationToken::new();
        let udp = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let udp_addr = udp.local_addr().unwrap();
        let tcp_addr = tcp.local_addr().unwrap();

        let server = DnsServer::new(engine.clone());
        let udp_server = server.clone();
        let udp_cancel = cancel.clone();
        tokio::spawn(async move { udp_server.serve_udp(udp, udp_cancel).await });
        let tcp_cancel = cancel.clone();
        tokio::spawn(async move { server.serve_tcp(tcp, tcp_cancel).await });

        let jwt = JwtConfig::default();
        let policy = RecordPolicy::default();
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
            verifier: Some(Arc::new(TokenVerifier::new(
                registry.clone(),
                VerifierSettings::from(&jwt),
            ))),
            cache: Some(cache.clone()),
            engine: engine.clone(),
        };

        TestServer {
            udp_addr,
            tcp_addr,
            router: create_api_routes(state),
            cache,
            engine,
            add_credential: AddCredentialUseCase::new(registry.clone()),
            registry,
            jwt,
            cancel,
            dir,
        }
    }
}

impl TestServer {
    pub async fn start() -> Self {
        TestServerBuilder::new().start().await
    }

    pub fn client(&self) -> TestClient {
        TestClient::new(self.udp_addr, self.tcp_addr)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.dir.path().join("jwt_subjects.json")
    }

    /// Adds a subject through the local-only path and signs a token for it.
    pub async fn issue_token(&self) -> (Uuid, String) {
        let issued = self
            .add_credential
            .execute(InvocationContext::Local, SigningAlgorithm::Es256)
            .await
            .unwrap();
        let token = TokenSigner::from_pem(&issued.private_key_pem)
            .unwrap()
            .issue(
                issued.subject_id,
                &self.jwt.issuer,
                &self.jwt.audience,
                Utc::now(),
                ChronoDuration::minutes(10),
            )
            .unwrap();
        (issued.subject_id, token)
    }

    pub async fn api(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {}", token));
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
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
