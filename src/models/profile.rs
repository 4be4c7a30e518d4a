// src/models/profile.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Um perfil por usuário autenticado (id = id do auth).
// phone/email sempre na forma canônica.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    #[schema(example = "Asha Verma")]
    pub full_name: Option<String>,
    #[schema(example = "9876543210")]
    pub phone: Option<String>,
    #[schema(example = "asha@example.com")]
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    #[schema(example = "560001")]
    pub pincode: Option<String>,
    // O app confere aqui se o aparelho já está registrado para push
    #[schema(example = "ExponentPushToken[xxxxxxxxxxxxxxxxxxxxxx]")]
    pub expo_push_token: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Linha semeada pelo sync preguiçoso quando o perfil ainda não existe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Campos já normalizados, prontos para o UPDATE.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub pincode: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Asha Verma")]
    pub full_name: Option<String>,

    #[schema(example = "+91 98765 43210")]
    pub phone: Option<String>,

    #[schema(example = "asha@example.com")]
    pub email: Option<String>,

    pub avatar_url: Option<String>,

    #[validate(length(equal = 6, message = "invalid_pincode"))]
    #[schema(example = "560001")]
    pub pincode: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PushTokenPayload {
    // None limpa o token (logout)
    #[schema(example = "ExponentPushToken[xxxxxxxxxxxxxxxxxxxxxx]")]
    pub expo_push_token: Option<String>,
}
