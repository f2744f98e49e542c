pub mod jwt;
pub mod server;
