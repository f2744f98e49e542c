pub mod dns;
pub mod tls;
pub mod web;

pub use dns::start_dns_server;
pub use tls::load_tls_acceptor;
pub use web::start_api_server;
