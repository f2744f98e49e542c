//! Builds upstream query messages in wire format with `hickory-proto`.

use homedns_domain::DomainError;
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};

/// Payload size advertised to upstreams; larger answers come back truncated
/// and are fetched again over TCP.
pub const UPSTREAM_EDNS_PAYLOAD: u16 = 1232;

pub struct MessageBuilder;

impl MessageBuilder {
    /// Builds a recursive query with a random id.
    ///
    /// # Returns
    /// The id (for response matching) and the serialized message
    pub fn build_query(name: &str, record_type: RecordType) -> Result<(u16, Vec<u8>), DomainError> {
        let name = Self::parse_name(name)?;
        let id = fastrand::u16(..);

        let mut edns = Edns::new();
        edns.set_max_payload(UPSTREAM_EDNS_PAYLOAD);

        let mut message = Message::new();
        message
            .set_id(id)
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true)
            .add_query(Query::query(name, record_type));
        message.set_edns(edns);

        let bytes = Self::serialize_message(&message)?;
        Ok((id, bytes))
    }

    pub fn parse_name(name: &str) -> Result<Name, DomainError> {
        let fqdn = if name.ends_with('.') {
            name.to_string()
        } else {
            format!("{}.", name)
        };
        Name::from_ascii(&fqdn).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", name, e))
        })
    }

    pub fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            DomainError::FormatError(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }
}
