pub mod error;
pub mod identity;
pub mod ttl_store;
