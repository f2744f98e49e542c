//! homedns application layer: ports, use cases and token services
pub mod ports;
pub mod services;
pub mod use_cases;
