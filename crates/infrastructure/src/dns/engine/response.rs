//! Response assembly and encoding.

use crate::dns::forwarding::MessageBuilder;
use hickory_proto::op::{Edns, Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::Record;
use tracing::warn;

/// Classic DNS limit for UDP payloads without EDNS.
pub const MAX_UDP_PAYLOAD: usize = 512;
/// Largest EDNS payload we honour from a client.
pub const MAX_EDNS_PAYLOAD: usize = 4096;
const SERVER_EDNS_PAYLOAD: u16 = 1232;

/// Starts a response that echoes the request id and question.
pub(crate) fn response_for(request: &Message, recursion_available: bool) -> Message {
    let mut response = Message::new();
    response
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_op_code(request.op_code())
        .set_recursion_desired(request.recursion_desired())
        .set_recursion_available(recursion_available)
        .add_queries(request.queries().to_vec());

    if request.extensions().is_some() {
        let mut edns = Edns::new();
        edns.set_max_payload(SERVER_EDNS_PAYLOAD);
        response.set_edns(edns);
    }
    response
}

pub(crate) fn with_answers(
    mut response: Message,
    rcode: ResponseCode,
    answers: Vec<Record>,
    authorities: Vec<Record>,
) -> Message {
    response
        .set_response_code(rcode)
        .add_answers(answers)
        .add_name_servers(authorities);
    response
}

/// Payload limit for a UDP reply to `request`.
pub(crate) fn udp_limit(request: &Message) -> usize {
    request
        .extensions()
        .as_ref()
        .map(|edns| usize::from(edns.max_payload()).clamp(MAX_UDP_PAYLOAD, MAX_EDNS_PAYLOAD))
        .unwrap_or(MAX_UDP_PAYLOAD)
}

/// Encodes `response`; when it exceeds `limit` the record sections are
/// dropped and TC is set so the client retries over TCP.
pub(crate) fn encode(mut response: Message, limit: Option<usize>) -> Vec<u8> {
    let encoded = match MessageBuilder::serialize_message(&response) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Failed to encode response, answering SERVFAIL");
            return error_bytes(response.id(), response.op_code(), ResponseCode::ServFail);
        }
    };

    match limit {
        Some(limit) if encoded.len() > limit => {
            response.take_answers();
            response.take_name_servers();
            response.take_additionals();
            response.set_truncated(true);
            MessageBuilder::serialize_message(&response).unwrap_or_else(|_| {
                error_bytes(response.id(), response.op_code(), ResponseCode::ServFail)
            })
        }
        _ => encoded,
    }
}

/// Header-only error reply.
pub(crate) fn error_bytes(id: u16, op_code: OpCode, rcode: ResponseCode) -> Vec<u8> {
    let message = Message::error_msg(id, op_code, rcode);
    MessageBuilder::serialize_message(&message).unwrap_or_else(|_| raw_error_header(id, rcode))
}

/// FORMERR for a packet that could not be decoded. The id is echoed when
/// at least two bytes arrived.
pub(crate) fn format_error_bytes(packet: &[u8]) -> Vec<u8> {
    let id = if packet.len() >= 2 {
        u16::from_be_bytes([packet[0], packet[1]])
    } else {
        0
    };
    error_bytes(id, OpCode::Query, ResponseCode::FormErr)
}

fn raw_error_header(id: u16, rcode: ResponseCode) -> Vec<u8> {
    let [id_hi, id_lo] = id.to_be_bytes();
    // QR=1, opcode 0; low nibble of the second flag byte is the rcode.
    let rcode_bits = (u16::from(rcode) & 0x0f) as u8;
    vec![id_hi, id_lo, 0x80, rcode_bits, 0, 0, 0, 0, 0, 0, 0, 0]
}
