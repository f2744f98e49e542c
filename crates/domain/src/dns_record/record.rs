use super::RecordType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One authoritative resource record.
///
/// Several records may share `(name, record_type)`; together they form the
/// record set answered for that key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Normalised owner name, lowercase without trailing dot
    pub name: String,
    pub record_type: RecordType,
    /// Presentation form of the data (`"192.0.2.1"`, `"10 mail.example.com"`, ...)
    pub value: String,
    /// Time to live in seconds
    pub ttl: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DnsRecord {
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        value: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            value: value.into(),
            ttl,
            updated_at: None,
        }
    }

    pub fn key(&self) -> (&str, RecordType) {
        (&self.name, self.record_type)
    }
}
