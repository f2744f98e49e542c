use crate::dns_record::RecordType;
use crate::errors::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr};

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;
const MAX_TXT_LEN: usize = 255;

/// Lowercases a domain name, strips the trailing dot and checks label syntax.
pub fn normalize_name(name: &str) -> Result<String, DomainError> {
    let trimmed = name.trim();
    let normalized = trimmed.strip_suffix('.').unwrap_or(trimmed).to_lowercase();

    if normalized.is_empty() {
        return Err(DomainError::InvalidDomainName(
            "name cannot be empty".to_string(),
        ));
    }
    if normalized.len() > MAX_NAME_LEN {
        return Err(DomainError::InvalidDomainName(format!(
            "name exceeds {} characters",
            MAX_NAME_LEN
        )));
    }

    for label in normalized.split('.') {
        validate_label(label, &normalized)?;
    }

    Ok(normalized)
}

fn validate_label(label: &str, name: &str) -> Result<(), DomainError> {
    if label.is_empty() || label.len() > MAX_LABEL_LEN {
        return Err(DomainError::InvalidDomainName(format!(
            "{}: label length must be 1..={}",
            name, MAX_LABEL_LEN
        )));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(DomainError::InvalidDomainName(format!(
            "{}: label '{}' cannot start or end with '-'",
            name, label
        )));
    }
    if !label
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(DomainError::InvalidDomainName(format!(
            "{}: label '{}' contains invalid characters",
            name, label
        )));
    }
    Ok(())
}

/// Checks the presentation value for a record type and returns it normalised.
pub fn normalize_value(record_type: RecordType, value: &str) -> Result<String, DomainError> {
    let value = value.trim();
    match record_type {
        RecordType::A => value
            .parse::<Ipv4Addr>()
            .map(|ip| ip.to_string())
            .map_err(|_| DomainError::Validation(format!("'{}' is not an IPv4 address", value))),
        RecordType::AAAA => value
            .parse::<Ipv6Addr>()
            .map(|ip| ip.to_string())
            .map_err(|_| DomainError::Validation(format!("'{}' is not an IPv6 address", value))),
        RecordType::CNAME => normalize_name(value)
            .map_err(|e| DomainError::Validation(format!("CNAME target: {}", e))),
        RecordType::MX => {
            let (preference, exchange) = parse_mx(value)?;
            Ok(format!("{} {}", preference, exchange))
        }
        RecordType::TXT => {
            if value.is_empty() || value.len() > MAX_TXT_LEN {
                return Err(DomainError::Validation(format!(
                    "TXT value length must be 1..={} bytes",
                    MAX_TXT_LEN
                )));
            }
            Ok(value.to_string())
        }
    }
}

/// Splits an MX value of the form `"<preference> <exchange>"`.
pub fn parse_mx(value: &str) -> Result<(u16, String), DomainError> {
    let mut parts = value.split_whitespace();
    let (Some(pref), Some(exchange), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(DomainError::Validation(format!(
            "MX value '{}' must be '<preference> <exchange>'",
            value
        )));
    };
    let preference = pref
        .parse::<u16>()
        .map_err(|_| DomainError::Validation(format!("MX preference '{}' is not 0..=65535", pref)))?;
    let exchange = normalize_name(exchange)
        .map_err(|e| DomainError::Validation(format!("MX exchange: {}", e)))?;
    Ok((preference, exchange))
}

pub fn validate_ttl(ttl: u32) -> Result<(), DomainError> {
    if ttl == 0 {
        return Err(DomainError::Validation(
            "TTL must be a positive number of seconds".to_string(),
        ));
    }
    Ok(())
}

/// True when `name` equals `domain` or is a subdomain of it.
///
/// Both arguments are expected in normalised form.
pub fn is_within_domain(name: &str, domain: &str) -> bool {
    if name == domain {
        return true;
    }
    name.len() > domain.len()
        && name.ends_with(domain)
        && name.as_bytes()[name.len() - domain.len() - 1] == b'.'
}
