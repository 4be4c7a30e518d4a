// src/handlers/messages.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::message::Message,
};

// GET /api/messages
#[utoipa::path(
    get,
    path = "/api/messages",
    tag = "Messages",
    responses(
        (status = 200, description = "Notificações do usuário, mais recentes primeiro", body = Vec<Message>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_messages(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let messages = app_state.message_service.inbox(user.id).await?;
    Ok((StatusCode::OK, Json(messages)))
}

// PATCH /api/messages/{id}/read
#[utoipa::path(
    patch,
    path = "/api/messages/{id}/read",
    tag = "Messages",
    params(("id" = Uuid, Path, description = "ID da mensagem")),
    responses(
        (status = 204, description = "Marcada como lida"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_message_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.message_service.mark_read(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
