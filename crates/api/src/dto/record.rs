use homedns_domain::{DnsRecord, RecordType};
use serde::{Deserialize, Serialize};

/// Body of create, update and upsert.
///
/// `hostname` and `address` are accepted for clients written against the
/// A-record-only API.
#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    #[serde(alias = "hostname")]
    pub name: String,
    #[serde(alias = "address")]
    pub value: String,
    #[serde(default)]
    pub ttl: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecordSearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordResponse {
    pub name: String,
    pub record_type: RecordType,
    pub value: String,
    pub ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<DnsRecord> for RecordResponse {
    fn from(record: DnsRecord) -> Self {
        Self {
            name: record.name,
            record_type: record.record_type,
            value: record.value,
            ttl: record.ttl,
            updated_at: record.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedRecordsResponse {
    pub removed: u64,
}
