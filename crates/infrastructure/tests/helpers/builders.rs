use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::{A, TXT};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use homedns_domain::DomainError;
use homedns_infrastructure::database::{create_memory_pool, run_migrations};
use homedns_infrastructure::dns::transport::{DnsTransport, TransportResponse};
use homedns_infrastructure::repositories::SqliteRecordRepository;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub async fn memory_repository() -> Arc<SqliteRecordRepository> {
    let pool = create_memory_pool().await.unwrap();
    run_migrations(&pool).await.unwrap();
    Arc::new(SqliteRecordRepository::new(pool))
}

pub fn fqdn(name: &str) -> Name {
    Name::from_str(&format!("{}.", name.trim_end_matches('.'))).unwrap()
}

pub fn query_packet(id: u16, name: &str, record_type: RecordType) -> Vec<u8> {
    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .add_query(Query::query(fqdn(name), record_type));
    message.to_vec().unwrap()
}

pub fn parse(bytes: &[u8]) -> Message {
    Message::from_vec(bytes).unwrap()
}

pub fn a_values(message: &Message) -> Vec<Ipv4Addr> {
    message
        .answers()
        .iter()
        .filter_map(|r| match r.data() {
            RData::A(a) => Some(a.0),
            _ => None,
        })
        .collect()
}

/// Builds a reply to `query` carrying the given answers.
pub fn reply_to(query: &[u8], rcode: ResponseCode, answers: Vec<Record>) -> Vec<u8> {
    let request = Message::from_vec(query).unwrap();
    let mut response = Message::new();
    response
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .set_recursion_available(true)
        .set_response_code(rcode)
        .add_queries(request.queries().to_vec())
        .add_answers(answers);
    response.to_vec().unwrap()
}

pub fn a_record(name: &Name, ip: Ipv4Addr, ttl: u32) -> Record {
    Record::from_rdata(name.clone(), ttl, RData::A(A(ip)))
}

pub fn txt_record(name: &Name, text: &str, ttl: u32) -> Record {
    Record::from_rdata(name.clone(), ttl, RData::TXT(TXT::new(vec![text.to_string()])))
}

#[derive(Clone, Copy, Debug)]
pub enum Behaviour {
    /// Never replies; the attempt runs into its timeout
    Silent,
    /// Fails immediately with an I/O error
    Unreachable,
    /// Answers A queries with this address
    Answer(Ipv4Addr, u32),
    /// Replies with the given rcode and no answers
    Rcode(ResponseCode),
    /// Replies with the TC bit set
    Truncated,
}

/// In-process upstream that follows a scripted behaviour and counts calls.
pub struct FakeTransport {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl FakeTransport {
    pub fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsTransport for FakeTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        _timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let bytes = match self.behaviour {
            Behaviour::Silent => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                unreachable!("the forwarder drops silent attempts on timeout")
            }
            Behaviour::Unreachable => {
                return Err(DomainError::IoError("connection refused".to_string()));
            }
            Behaviour::Answer(ip, ttl) => {
                let request = Message::from_vec(message_bytes).unwrap();
                let name = request.queries()[0].name().clone();
                reply_to(message_bytes, ResponseCode::NoError, vec![a_record(&name, ip, ttl)])
            }
            Behaviour::Rcode(rcode) => reply_to(message_bytes, rcode, vec![]),
            Behaviour::Truncated => {
                let reply = reply_to(message_bytes, ResponseCode::NoError, vec![]);
                let mut message = Message::from_vec(&reply).unwrap();
                message.set_truncated(true);
                message.to_vec().unwrap()
            }
        };

        Ok(TransportResponse {
            bytes,
            protocol_used: "FAKE",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "FAKE"
    }
}
