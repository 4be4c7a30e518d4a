// src/models/customer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    #[schema(ignore)] // O dono vem do token
    pub user_id: Uuid,
    #[schema(example = "Acme Traders")]
    pub name: String,
    #[schema(example = "9876543210")]
    pub phone: Option<String>,
    #[schema(example = "billing@acme.in")]
    pub email: Option<String>,
    #[schema(example = "AT")]
    pub initials: Option<String>,
    #[schema(example = "#4F46E5")]
    pub color: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub initials: String,
    pub color: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Acme Traders")]
    pub name: String,

    #[schema(example = "+91 98765 43210")]
    pub phone: Option<String>,

    #[schema(example = "billing@acme.in")]
    pub email: Option<String>,
}
