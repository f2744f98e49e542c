use crate::{CacheSweepJob, RegistryReloadJob};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Central orchestrator for all background jobs.
///
/// Every registered job runs under the runner's cancellation token, which
/// overrides any token set on the job itself. `start` hands back the running
/// set so shutdown can wait for each loop to finish.
///
/// # Example
///
/// ```rust,ignore
/// let jobs = JobRunner::new()
///     .with_cache_sweep(CacheSweepJob::new(cache).with_interval(60))
///     .with_registry_reload(RegistryReloadJob::new(registry).with_interval(5))
///     .with_cancellation(cancel)
///     .start()
///     .await;
/// // ...
/// jobs.shutdown().await;
/// ```
pub struct JobRunner {
    cache_sweep: Option<CacheSweepJob>,
    registry_reload: Option<RegistryReloadJob>,
    shutdown: CancellationToken,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            cache_sweep: None,
            registry_reload: None,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cache_sweep(mut self, job: CacheSweepJob) -> Self {
        self.cache_sweep = Some(job);
        self
    }

    pub fn with_registry_reload(mut self, job: RegistryReloadJob) -> Self {
        self.registry_reload = Some(job);
        self
    }

    /// Jobs stop when `token` (or the returned `RunningJobs`) is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Start all registered background jobs.
    pub async fn start(self) -> RunningJobs {
        info!("Starting background job runner");
        let mut handles = Vec::new();

        if let Some(job) = self.cache_sweep {
            let job = job.with_cancellation(self.shutdown.child_token());
            handles.push(("cache_sweep", Arc::new(job).start().await));
        }

        if let Some(job) = self.registry_reload {
            let job = job.with_cancellation(self.shutdown.child_token());
            handles.push(("registry_reload", Arc::new(job).start().await));
        }

        info!(jobs = handles.len(), "All background jobs started");
        RunningJobs {
            shutdown: self.shutdown,
            handles,
        }
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Jobs started by a `JobRunner`.
pub struct RunningJobs {
    shutdown: CancellationToken,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl RunningJobs {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Cancels every job and waits until each loop has exited.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for (job, handle) in self.handles {
            if let Err(e) = handle.await {
                error!(job, error = %e, "Background job ended abnormally");
            }
        }
        info!("All background jobs stopped");
    }
}
