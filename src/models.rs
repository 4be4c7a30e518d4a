pub mod auth;
pub mod customer;
pub mod document;
pub mod message;
pub mod profile;
