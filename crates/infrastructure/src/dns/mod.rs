pub mod cache;
pub mod engine;
pub mod forwarding;
pub mod record_type_map;
pub mod server;
pub mod transport;

pub use cache::{CacheStats, DnsCache};
pub use engine::{EngineStats, Protocol, QueryEngine};
pub use forwarding::{ForwardedAnswer, Forwarder};
pub use server::DnsServer;
