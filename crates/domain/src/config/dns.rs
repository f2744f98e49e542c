use crate::forward_target::ForwardTarget;
use crate::validators::normalize_name;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to do with a record whose TTL is below `ttl_floor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TtlFloorPolicy {
    /// Accept the record and log a warning
    #[default]
    Warn,
    /// Refuse the record with a validation error
    Reject,
}

/// DNS resolution configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// Zones this server is the source of truth for. Queries inside them
    /// are never forwarded.
    #[serde(default)]
    pub authoritative_domains: Vec<String>,

    /// TTL applied when a control API caller omits one
    #[serde(default = "default_ttl")]
    pub default_ttl: u32,

    #[serde(default = "default_ttl_floor")]
    pub ttl_floor: u32,

    #[serde(default)]
    pub ttl_floor_policy: TtlFloorPolicy,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub forwarding: ForwardingConfig,
}

impl DnsConfig {
    /// Authoritative domains in normalised form; unparsable entries are skipped.
    pub fn normalized_domains(&self) -> Vec<String> {
        self.authoritative_domains
            .iter()
            .filter_map(|d| normalize_name(d).ok())
            .collect()
    }
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            authoritative_domains: vec![],
            default_ttl: default_ttl(),
            ttl_floor: default_ttl_floor(),
            ttl_floor_policy: TtlFloorPolicy::default(),
            cache: CacheConfig::default(),
            forwarding: ForwardingConfig::default(),
        }
    }
}

/// Resolution cache settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Upper bound on cached keys; 0 leaves the cache unbounded.
    /// When bounded, the least recently used key is evicted first.
    #[serde(default)]
    pub max_entries: usize,

    /// Interval of the background sweep of expired entries
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 0,
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// Upstream forwarding settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForwardingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Upstream resolvers, tried in order
    #[serde(default = "default_forward_servers")]
    pub servers: Vec<ForwardTarget>,

    /// Timeout ladder in seconds; every server is tried once per step
    #[serde(default = "default_forward_timeouts")]
    pub timeouts: Vec<u64>,
}

impl ForwardingConfig {
    pub fn timeout_ladder(&self) -> Vec<Duration> {
        self.timeouts.iter().map(|s| Duration::from_secs(*s)).collect()
    }
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            servers: default_forward_servers(),
            timeouts: default_forward_timeouts(),
        }
    }
}

fn default_ttl() -> u32 {
    600
}

fn default_ttl_floor() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_forward_servers() -> Vec<ForwardTarget> {
    ["208.67.222.222", "208.67.220.220"]
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect()
}

fn default_forward_timeouts() -> Vec<u64> {
    vec![1, 3, 11, 30]
}
