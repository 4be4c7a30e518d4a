pub mod auth;
pub mod customer_service;
pub mod document_service;
pub mod email;
pub mod message_service;
pub mod notification_service;
pub mod otp_service;
pub mod password_reset;
pub mod profile_resolver;
pub mod profile_service;
pub mod push;
pub mod recipient_resolver;
