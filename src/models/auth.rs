// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Metadados que o app grava no Supabase Auth durante o cadastro
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

// Estrutura de dados ("claims") do access token do Supabase
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // ID do usuário no auth
    pub exp: usize, // Expiration time
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<UserMetadata>,
}

/// Identidade verificada do chamador, como o provedor de auth entrega a cada requisição.
#[derive(Debug, Clone, Default)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub user_metadata: UserMetadata,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        // O Supabase manda string vazia quando o campo não existe
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            id: claims.sub,
            email: non_empty(claims.email),
            phone: non_empty(claims.phone),
            user_metadata: claims.user_metadata.unwrap_or_default(),
        }
    }
}

impl AuthUser {
    /// Nome para exibir em notificações.
    pub fn display_name(&self) -> String {
        self.user_metadata
            .full_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.email.clone())
            .or_else(|| self.phone.clone())
            .unwrap_or_else(|| "Someone".to_string())
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendOtpPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "user@example.com")]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyOtpPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "user@example.com")]
    pub email: String,

    #[validate(length(equal = 6, message = "invalid_code"))]
    #[schema(example = "482913")]
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OtpResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "user@example.com")]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RedeemResetTokenPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "q8ZkT2mW9xLr4NbV7cYp1HsD6fJa3GeU")]
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RedeemResetTokenResponse {
    #[schema(example = "user@example.com")]
    pub email: String,
}
