use homedns_domain::config::DnsConfig;
use homedns_domain::validators::{normalize_name, normalize_value, validate_ttl};
use homedns_domain::{DnsRecord, DomainError, RecordType, TtlFloorPolicy};
use tracing::warn;

/// Input validation and TTL rules shared by the record mutations.
#[derive(Debug, Clone, Copy)]
pub struct RecordPolicy {
    pub default_ttl: u32,
    pub ttl_floor: u32,
    pub floor_policy: TtlFloorPolicy,
}

impl RecordPolicy {
    pub fn from_config(config: &DnsConfig) -> Self {
        Self {
            default_ttl: config.default_ttl,
            ttl_floor: config.ttl_floor,
            floor_policy: config.ttl_floor_policy,
        }
    }

    /// Normalises caller input into a storable record.
    ///
    /// # Errors
    ///
    /// * `DomainError::Validation` - bad value, zero TTL, or a TTL under the
    ///   floor with the reject policy
    /// * `DomainError::InvalidDomainName` - bad owner name
    pub fn prepare(
        &self,
        name: &str,
        record_type: RecordType,
        value: &str,
        ttl: Option<u32>,
    ) -> Result<DnsRecord, DomainError> {
        let name = normalize_name(name)?;
        let value = normalize_value(record_type, value)?;
        let ttl = ttl.unwrap_or(self.default_ttl);
        validate_ttl(ttl)?;

        if ttl < self.ttl_floor {
            match self.floor_policy {
                TtlFloorPolicy::Reject => {
                    return Err(DomainError::Validation(format!(
                        "TTL {}s is below the floor of {}s",
                        ttl, self.ttl_floor
                    )));
                }
                TtlFloorPolicy::Warn => {
                    warn!(
                        name = %name,
                        record_type = %record_type,
                        ttl,
                        floor = self.ttl_floor,
                        "TTL below configured floor"
                    );
                }
            }
        }

        Ok(DnsRecord::new(name, record_type, value, ttl))
    }
}

impl Default for RecordPolicy {
    fn default() -> Self {
        Self::from_config(&DnsConfig::default())
    }
}
