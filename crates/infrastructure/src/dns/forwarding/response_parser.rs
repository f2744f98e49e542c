use homedns_domain::DomainError;
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::{Record, RecordType};
use tracing::debug;

/// An upstream reply that passed validation.
#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub rcode: ResponseCode,
    pub truncated: bool,
    pub answers: Vec<Record>,
    pub authorities: Vec<Record>,
    pub min_ttl: Option<u32>,
}

impl DnsResponse {
    pub fn is_nxdomain(&self) -> bool {
        self.rcode == ResponseCode::NXDomain
    }

    /// Rcodes that say nothing about the name and justify another attempt.
    pub fn is_server_error(&self) -> bool {
        !matches!(self.rcode, ResponseCode::NoError | ResponseCode::NXDomain)
    }
}

pub struct ResponseParser;

impl ResponseParser {
    /// Decodes an upstream reply and checks that it answers our question:
    /// same id, QR bit set, and the question echoed back.
    pub fn parse(
        bytes: &[u8],
        expected_id: u16,
        name: &str,
        record_type: RecordType,
    ) -> Result<DnsResponse, DomainError> {
        let message = Message::from_vec(bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to parse DNS response: {}", e))
        })?;

        if message.id() != expected_id {
            return Err(DomainError::InvalidDnsResponse(format!(
                "id mismatch: expected {}, got {}",
                expected_id,
                message.id()
            )));
        }

        if message.message_type() != MessageType::Response {
            return Err(DomainError::InvalidDnsResponse(
                "message is not a response".to_string(),
            ));
        }

        let question_matches = message.queries().first().is_some_and(|q| {
            q.query_type() == record_type
                && q.name()
                    .to_ascii()
                    .trim_end_matches('.')
                    .eq_ignore_ascii_case(name.trim_end_matches('.'))
        });
        // A truncated reply may legitimately drop the question section.
        if !question_matches && !message.truncated() {
            return Err(DomainError::InvalidDnsResponse(format!(
                "response does not answer {} {}",
                name, record_type
            )));
        }

        let min_ttl = message.answers().iter().map(|r| r.ttl()).min();
        let rcode = message.response_code();
        let truncated = message.truncated();

        debug!(
            rcode = ?rcode,
            answers = message.answers().len(),
            truncated = truncated,
            "DNS response parsed"
        );

        let mut message = message;
        Ok(DnsResponse {
            rcode,
            truncated,
            answers: message.take_answers(),
            authorities: message.take_name_servers(),
            min_ttl,
        })
    }
}
