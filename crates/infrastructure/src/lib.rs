//! homedns infrastructure: SQLite record store, JSON credential registry,
//! resolution cache, upstream forwarding and the DNS wire front end.
pub mod database;
pub mod dns;
pub mod registry;
pub mod repositories;
