use super::engine::{Protocol, QueryEngine, MAX_EDNS_PAYLOAD};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Idle limit for a TCP client between two queries.
pub const TCP_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Queries one TCP connection may have outstanding at once.
pub const TCP_MAX_IN_FLIGHT: usize = 64;

/// UDP and TCP listeners in front of a `QueryEngine`.
///
/// Every query runs in its own task, so a slow forward never holds up
/// other clients or later queries on the same TCP connection.
#[derive(Clone)]
pub struct DnsServer {
    engine: Arc<QueryEngine>,
}

impl DnsServer {
    pub fn new(engine: Arc<QueryEngine>) -> Self {
        Self { engine }
    }

    pub async fn serve_udp(
        &self,
        socket: UdpSocket,
        cancel: CancellationToken,
    ) -> std::io::Result<()> {
        let socket = Arc::new(socket);
        info!(protocol = "UDP", local = %socket.local_addr()?, "DNS server listening");

        let mut buf = vec![0u8; MAX_EDNS_PAYLOAD];
        loop {
            let (len, peer) = tokio::select! {
                _ = cancel.cancelled() => break,
                received = socket.recv_from(&mut buf) => match received {
                    Ok(received) => received,
                    Err(e) => {
                        // ICMP port-unreachable from an earlier reply shows up here on some platforms.
                        debug!(error = %e, "UDP receive error");
                        continue;
                    }
                },
            };

            let packet = buf[..len].to_vec();
            let engine = Arc::clone(&self.engine);
            let socket = Arc::clone(&socket);
            tokio::spawn(async move {
                let reply = engine.handle(&packet, Protocol::Udp).await;
                if let Err(e) = socket.send_to(&reply, peer).await {
                    warn!(peer = %peer, error = %e, "Failed to send UDP reply");
                }
            });
        }

        info!(protocol = "UDP", "DNS server stopped");
        Ok(())
    }

    pub async fn serve_tcp(
        &self,
        listener: TcpListener,
        cancel: CancellationToken,
    ) -> std::io::Result<()> {
        info!(protocol = "TCP", local = %listener.local_addr()?, "DNS server listening");

        loop {
            let (stream, peer) = tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(error = %e, "TCP accept failed");
                        continue;
                    }
                },
            };

            let engine = Arc::clone(&self.engine);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    result = serve_connection(engine, stream, peer) => {
                        if let Err(e) = result {
                            debug!(peer = %peer, error = %e, "TCP connection closed with error");
                        }
                    }
                }
            });
        }

        info!(protocol = "TCP", "DNS server stopped");
        Ok(())
    }
}

/// Serves length-prefixed queries on one connection until the client goes
/// quiet for `TCP_IDLE_TIMEOUT` or closes.
///
/// Each query is answered in its own task and replies are written as they
/// complete, so they may leave in a different order than the queries came in.
async fn serve_connection(
    engine: Arc<QueryEngine>,
    stream: TcpStream,
    peer: SocketAddr,
) -> std::io::Result<()> {
    let (reader, writer) = stream.into_split();
    let (replies_tx, replies_rx) = mpsc::channel(TCP_MAX_IN_FLIGHT);

    tokio::try_join!(
        read_queries(engine, reader, replies_tx, peer),
        write_replies(writer, replies_rx, peer),
    )?;
    Ok(())
}

async fn read_queries(
    engine: Arc<QueryEngine>,
    mut reader: OwnedReadHalf,
    replies: mpsc::Sender<Vec<u8>>,
    peer: SocketAddr,
) -> std::io::Result<()> {
    loop {
        let mut len_buf = [0u8; 2];
        match tokio::time::timeout(TCP_IDLE_TIMEOUT, reader.read_exact(&mut len_buf)).await {
            Err(_) => {
                debug!(peer = %peer, "TCP connection idle, closing");
                return Ok(());
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
            Ok(Err(e)) => return Err(e),
            Ok(Ok(_)) => {}
        }

        let len = usize::from(u16::from_be_bytes(len_buf));
        let mut packet = vec![0u8; len];
        tokio::time::timeout(TCP_IDLE_TIMEOUT, reader.read_exact(&mut packet))
            .await
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "partial TCP query"))??;

        // Backpressure: stop reading while the writer is saturated.
        let permit = replies
            .clone()
            .reserve_owned()
            .await
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::BrokenPipe, "TCP writer gone"))?;
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            let reply = engine.handle(&packet, Protocol::Tcp).await;
            permit.send(reply);
        });
    }
}

async fn write_replies(
    mut writer: OwnedWriteHalf,
    mut replies: mpsc::Receiver<Vec<u8>>,
    peer: SocketAddr,
) -> std::io::Result<()> {
    while let Some(reply) = replies.recv().await {
        let Ok(reply_len) = u16::try_from(reply.len()) else {
            warn!(peer = %peer, bytes = reply.len(), "Reply too large for TCP framing");
            continue;
        };

        let mut framed = Vec::with_capacity(reply.len() + 2);
        framed.extend_from_slice(&reply_len.to_be_bytes());
        framed.extend_from_slice(&reply);
        writer.write_all(&framed).await?;
    }
    writer.shutdown().await
}
