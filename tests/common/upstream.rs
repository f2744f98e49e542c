use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record, RecordType};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// Loopback UDP resolver standing in for an upstream.
///
/// An answering upstream replies to A queries with a fixed address; names
/// starting with `missing.` get NXDOMAIN. A silent upstream counts queries
/// and never replies.
pub struct MockUpstream {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl MockUpstream {
    pub async fn answering(address: Ipv4Addr, ttl: u32) -> Self {
        Self::start(Some((address, ttl))).await
    }

    pub async fn silent() -> Self {
        Self::start(None).await
    }

    async fn start(answer: Option<(Ipv4Addr, u32)>) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let queries = Arc::new(AtomicUsize::new(0));
        let counter = queries.clone();

        let handle = tokio::spawn(async move {
            let mut buf = [0u8; 4096];
            loop {
                let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);

                let Some((address, ttl)) = answer else {
                    continue;
                };
                let Ok(request) = Message::from_vec(&buf[..len]) else {
                    continue;
                };
                let bytes = reply(&request, address, ttl);
                let _ = socket.send_to(&bytes, peer).await;
            }
        });

        Self {
            addr,
            queries,
            handle,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn reply(request: &Message, address: Ipv4Addr, ttl: u32) -> Vec<u8> {
    let mut response = Message::new();
    response
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(request.recursion_desired())
        .set_recursion_available(true)
        .add_queries(request.queries().to_vec());

    if let Some(question) = request.queries().first() {
        if question.name().to_ascii().starts_with("missing.") {
            response.set_response_code(ResponseCode::NXDomain);
        } else if question.query_type() == RecordType::A {
            response.add_answer(Record::from_rdata(
                question.name().clone(),
                ttl,
                RData::A(A(address)),
            ));
        }
    }

    response.to_vec().unwrap()
}
