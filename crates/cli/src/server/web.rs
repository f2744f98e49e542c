use anyhow::Context;
use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use hyper_util::service::TowerToHyperService;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Serves the control API, over TLS when an acceptor is given.
pub async fn start_api_server(
    bind_addr: SocketAddr,
    router: Router,
    tls: Option<TlsAcceptor>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("cannot bind control API on {}", bind_addr))?;
    let router = router.layer(TraceLayer::new_for_http());

    match tls {
        Some(acceptor) => {
            info!(bind_address = %bind_addr, "Control API listening (HTTPS)");
            serve_tls(listener, router, acceptor, cancel).await;
        }
        None => {
            warn!(bind_address = %bind_addr, "Control API listening without TLS");
            axum::serve(listener, router)
                .with_graceful_shutdown(cancel.cancelled_owned())
                .await
                .context("control API server failed")?;
        }
    }

    info!("Control API stopped");
    Ok(())
}

async fn serve_tls(
    listener: TcpListener,
    router: Router,
    acceptor: TlsAcceptor,
    cancel: CancellationToken,
) {
    loop {
        let (stream, peer) = tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "Failed to accept control API connection");
                    continue;
                }
            },
        };

        let acceptor = acceptor.clone();
        let service = TowerToHyperService::new(router.clone());
        let cancel = cancel.clone();

        tokio::spawn(async move {
            let tls_stream = match acceptor.accept(stream).await {
                Ok(s) => s,
                Err(e) => {
                    debug!(peer = %peer, error = %e, "TLS handshake failed");
                    return;
                }
            };

            let builder = Builder::new(TokioExecutor::new());
            let connection = builder.serve_connection(TokioIo::new(tls_stream), service);
            tokio::select! {
                result = connection => {
                    if let Err(e) = result {
                        debug!(peer = %peer, error = %e, "Control API connection closed with error");
                    }
                }
                _ = cancel.cancelled() => {}
            }
        });
    }
}
