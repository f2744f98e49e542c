use homedns_infrastructure::dns::{CacheStats, EngineStats};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
    pub engine: EngineStats,
}
