use homedns_application::ports::CredentialRepository;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Picks up `homedns jwt add/remove` runs made while the server is live by
/// reloading the credential registry when its file changed.
pub struct RegistryReloadJob {
    registry: Arc<dyn CredentialRepository>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl RegistryReloadJob {
    pub fn new(registry: Arc<dyn CredentialRepository>) -> Self {
        Self {
            registry,
            interval_secs: 5,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// A failed reload keeps the subjects already in memory.
    pub async fn run_once(&self) -> bool {
        match self.registry.reload_if_changed().await {
            Ok(reloaded) => reloaded,
            Err(e) => {
                error!(error = %e, "Credential registry reload failed, keeping current subjects");
                false
            }
        }
    }

    pub async fn start(self: Arc<Self>) -> JoinHandle<()> {
        info!(
            interval_secs = self.interval_secs,
            "Starting credential registry reload job"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("RegistryReloadJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        self.run_once().await;
                    }
                }
            }
        })
    }
}
