pub mod cache;
pub mod credentials;
pub mod health;
pub mod records;

pub use health::health_check;
