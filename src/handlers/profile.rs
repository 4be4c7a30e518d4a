// src/handlers/profile.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::profile::{Profile, PushTokenPayload, UpdateProfilePayload},
};

// GET /api/profile
#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    responses(
        (status = 200, description = "Perfil do usuário logado", body = Profile),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let profile = app_state.profile_service.me(&user).await?;
    Ok((StatusCode::OK, Json(profile)))
}

// PUT /api/profile
#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "Profile",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = Profile),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let profile = app_state.profile_service.update(&user, payload).await?;
    Ok((StatusCode::OK, Json(profile)))
}

// PUT /api/profile/push-token
#[utoipa::path(
    put,
    path = "/api/profile/push-token",
    tag = "Profile",
    request_body = PushTokenPayload,
    responses(
        (status = 204, description = "Token salvo (ou removido)"),
        (status = 400, description = "Token fora do formato Expo")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_push_token(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<PushTokenPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .profile_service
        .set_push_token(&user, payload.expo_push_token.as_deref())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
