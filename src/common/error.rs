use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Regra de negócio violada no payload (ex: documento sem destinatário)
    #[error("{0}")]
    InvalidInput(String),

    #[error("Token inválido")]
    InvalidToken,

    // "Não existe" e "não é seu" devolvem o mesmo sinal
    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("Código de verificação inválido ou expirado")]
    InvalidVerificationCode,

    #[error("Token de redefinição de senha inválido ou expirado")]
    InvalidResetToken,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message),
            AppError::InvalidToken | AppError::JwtError(_) => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid authentication token.".to_string(),
            ),
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found.", what)),
            AppError::InvalidVerificationCode => (
                StatusCode::BAD_REQUEST,
                "Invalid or expired verification code.".to_string(),
            ),
            AppError::InvalidResetToken => (
                StatusCode::BAD_REQUEST,
                "Invalid or expired reset token.".to_string(),
            ),
            // Falha do banco nas escritas principais: a mensagem do banco vai junto
            AppError::DatabaseError(e) => {
                tracing::error!(error = %e, "Erro de banco de dados");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
