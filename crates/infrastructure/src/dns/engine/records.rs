//! Conversion of stored records into wire records.

use crate::dns::forwarding::MessageBuilder;
use hickory_proto::rr::rdata::{A, AAAA, CNAME, MX, TXT};
use hickory_proto::rr::{Name, RData, Record};
use homedns_domain::validators::parse_mx;
use homedns_domain::{DnsRecord, DomainError, RecordType};
use std::net::{Ipv4Addr, Ipv6Addr};

pub(crate) fn to_wire_record(owner: &Name, record: &DnsRecord) -> Result<Record, DomainError> {
    let rdata = match record.record_type {
        RecordType::A => RData::A(A(parse_value::<Ipv4Addr>(record)?)),
        RecordType::AAAA => RData::AAAA(AAAA(parse_value::<Ipv6Addr>(record)?)),
        RecordType::CNAME => RData::CNAME(CNAME(MessageBuilder::parse_name(&record.value)?)),
        RecordType::MX => {
            let (preference, exchange) = parse_mx(&record.value)?;
            RData::MX(MX::new(preference, MessageBuilder::parse_name(&exchange)?))
        }
        RecordType::TXT => RData::TXT(TXT::new(vec![record.value.clone()])),
    };
    Ok(Record::from_rdata(owner.clone(), record.ttl, rdata))
}

fn parse_value<T: std::str::FromStr>(record: &DnsRecord) -> Result<T, DomainError> {
    record.value.parse::<T>().map_err(|_| {
        DomainError::DatabaseError(format!(
            "stored {} value '{}' for {} is not valid",
            record.record_type, record.value, record.name
        ))
    })
}
