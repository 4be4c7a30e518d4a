// src/handlers/auth.rs
//
// O login é do Supabase; aqui ficam só os códigos de verificação por e-mail
// e os tokens de redefinição de senha.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{
        ForgotPasswordPayload, OtpResponse, RedeemResetTokenPayload, RedeemResetTokenResponse, SendOtpPayload,
        VerifyOtpPayload,
    },
};

// POST /api/auth/otp/send
#[utoipa::path(
    post,
    path = "/api/auth/otp/send",
    tag = "Auth",
    request_body = SendOtpPayload,
    responses(
        (status = 200, description = "Código enviado", body = OtpResponse),
        (status = 400, description = "E-mail inválido")
    )
)]
pub async fn send_otp(
    State(app_state): State<AppState>,
    Json(payload): Json<SendOtpPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state.otp_service.send(&payload.email).await?;

    Ok((StatusCode::OK, Json(OtpResponse { success: true })))
}

// POST /api/auth/otp/verify
#[utoipa::path(
    post,
    path = "/api/auth/otp/verify",
    tag = "Auth",
    request_body = VerifyOtpPayload,
    responses(
        (status = 200, description = "Código válido (e consumido)", body = OtpResponse),
        (status = 400, description = "Código inválido ou expirado")
    )
)]
pub async fn verify_otp(
    State(app_state): State<AppState>,
    Json(payload): Json<VerifyOtpPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state.otp_service.verify(&payload.email, &payload.code).await?;

    Ok((StatusCode::OK, Json(OtpResponse { success: true })))
}

// POST /api/auth/password/forgot
#[utoipa::path(
    post,
    path = "/api/auth/password/forgot",
    tag = "Auth",
    request_body = ForgotPasswordPayload,
    responses(
        (status = 200, description = "Token de redefinição enviado por e-mail", body = OtpResponse),
        (status = 400, description = "E-mail inválido")
    )
)]
pub async fn forgot_password(
    State(app_state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state.password_reset_service.issue(&payload.email).await?;

    Ok((StatusCode::OK, Json(OtpResponse { success: true })))
}

// POST /api/auth/password/redeem
#[utoipa::path(
    post,
    path = "/api/auth/password/redeem",
    tag = "Auth",
    request_body = RedeemResetTokenPayload,
    responses(
        (status = 200, description = "Token válido (e consumido)", body = RedeemResetTokenResponse),
        (status = 400, description = "Token inválido, expirado ou já usado")
    )
)]
pub async fn redeem_reset_token(
    State(app_state): State<AppState>,
    Json(payload): Json<RedeemResetTokenPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let email = app_state.password_reset_service.redeem(&payload.token).await?;

    Ok((StatusCode::OK, Json(RedeemResetTokenResponse { email })))
}
