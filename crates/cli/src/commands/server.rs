use crate::di::{DnsServices, Repositories, UseCases};
use crate::server::{load_tls_acceptor, start_api_server, start_dns_server};
use anyhow::Context;
use homedns_api::create_api_routes;
use homedns_application::ports::{CacheMaintenance, CredentialRepository};
use homedns_domain::Config;
use homedns_jobs::{CacheSweepJob, JobRunner, RegistryReloadJob, RunningJobs};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Runs the DNS listeners, the control API and the background jobs until
/// Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let bind_ip: IpAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind_address))?;
    let dns_addr = SocketAddr::new(bind_ip, config.server.dns_port);
    let api_addr = SocketAddr::new(bind_ip, config.server.api_port);

    let tls = match (&config.server.tls_cert, &config.server.tls_key) {
        (Some(cert), Some(key)) => Some(load_tls_acceptor(cert, key)?),
        _ => None,
    };

    let repos = Repositories::new(&config).await?;
    let dns = DnsServices::new(&config, &repos);
    let state = UseCases::new(&config, &repos, &dns).into_app_state(&config, &repos, &dns);

    let cancel = CancellationToken::new();
    let jobs = start_jobs(&config, &repos, &dns, cancel.clone()).await;

    let dns_task = tokio::spawn(start_dns_server(dns_addr, dns.engine.clone(), cancel.clone()));
    let api_task = tokio::spawn(start_api_server(
        api_addr,
        create_api_routes(state),
        tls,
        cancel.clone(),
    ));

    info!("Server ready! Press Ctrl+C to stop");

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(e) => error!(error = %e, "Cannot listen for Ctrl-C, shutting down"),
        }
        shutdown.cancel();
    });

    // Either listener failing takes the whole process down.
    let (dns_result, api_result) = tokio::join!(
        watch(dns_task, cancel.clone()),
        watch(api_task, cancel.clone()),
    );
    jobs.shutdown().await;
    dns_result?;
    api_result?;

    info!("homedns stopped");
    Ok(())
}

async fn watch(
    task: tokio::task::JoinHandle<anyhow::Result<()>>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let result = match task.await {
        Ok(result) => result,
        Err(e) => Err(anyhow::anyhow!("server task panicked: {}", e)),
    };
    if let Err(e) = &result {
        error!(error = %e, "Server task failed");
        cancel.cancel();
    }
    result
}

async fn start_jobs(
    config: &Config,
    repos: &Repositories,
    dns: &DnsServices,
    cancel: CancellationToken,
) -> RunningJobs {
    let mut runner = JobRunner::new().with_cancellation(cancel);

    if let Some(cache) = &dns.cache {
        let cache: Arc<dyn CacheMaintenance> = cache.clone();
        runner = runner.with_cache_sweep(
            CacheSweepJob::new(cache).with_interval(config.dns.cache.sweep_interval_secs),
        );
    }

    let registry: Arc<dyn CredentialRepository> = repos.registry.clone();
    runner = runner.with_registry_reload(
        RegistryReloadJob::new(registry).with_interval(config.jwt.reload_interval_secs),
    );

    runner.start().await
}
