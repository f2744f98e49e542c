use anyhow::Context;
use homedns_infrastructure::dns::{DnsServer, QueryEngine};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, UdpSocket};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Binds UDP and TCP on the same address and serves both until `cancel`
/// fires.
pub async fn start_dns_server(
    bind_addr: SocketAddr,
    engine: Arc<QueryEngine>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    info!(bind_address = %bind_addr, "Starting DNS server");

    let udp_socket = UdpSocket::bind(bind_addr)
        .await
        .with_context(|| format!("cannot bind UDP {}", bind_addr))?;
    info!(protocol = "UDP", "DNS server listening");

    let tcp_listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("cannot bind TCP {}", bind_addr))?;
    info!(protocol = "TCP", "DNS server listening");

    let server = DnsServer::new(engine);
    let (udp, tcp) = tokio::join!(
        server.serve_udp(udp_socket, cancel.clone()),
        server.serve_tcp(tcp_listener, cancel),
    );
    udp.context("UDP listener failed")?;
    tcp.context("TCP listener failed")?;

    info!("DNS server stopped");
    Ok(())
}
