pub mod auth;
pub mod customers;
pub mod documents;
pub mod messages;
pub mod profile;
