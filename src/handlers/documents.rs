// src/handlers/documents.rs
//
// Faturas e orçamentos: mesmas regras, rotas separadas.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::document::{CreateDocumentPayload, DocumentDetail, DocumentKind},
};

async fn create(
    app_state: AppState,
    kind: DocumentKind,
    user: AuthenticatedUser,
    payload: CreateDocumentPayload,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let detail = app_state.document_service.create(kind, &user.0, payload).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn list(app_state: AppState, kind: DocumentKind, user: AuthenticatedUser) -> Result<impl IntoResponse, AppError> {
    let documents = app_state.document_service.list(kind, &user.0).await?;
    Ok((StatusCode::OK, Json(documents)))
}

async fn get(
    app_state: AppState,
    kind: DocumentKind,
    user: AuthenticatedUser,
    id: Uuid,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.document_service.get(kind, &user.0, id).await?;
    Ok((StatusCode::OK, Json(detail)))
}

async fn delete(
    app_state: AppState,
    kind: DocumentKind,
    user: AuthenticatedUser,
    id: Uuid,
) -> Result<impl IntoResponse, AppError> {
    app_state.document_service.delete(kind, &user.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  FATURAS
// =============================================================================

// POST /api/invoices
#[utoipa::path(
    post,
    path = "/api/invoices",
    tag = "Invoices",
    request_body = CreateDocumentPayload,
    responses(
        (status = 201, description = "Fatura criada e destinatários notificados", body = DocumentDetail),
        (status = 400, description = "Número ausente, itens negativos ou sem telefone/e-mail do destinatário"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_invoice(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateDocumentPayload>,
) -> Result<impl IntoResponse, AppError> {
    create(app_state, DocumentKind::Invoice, user, payload).await
}

// GET /api/invoices
#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Invoices",
    responses(
        (status = 200, description = "Enviadas e recebidas (type = sent | received)", body = Vec<DocumentDetail>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    list(app_state, DocumentKind::Invoice, user).await
}

// GET /api/invoices/{id}
#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 200, description = "Fatura", body = DocumentDetail),
        (status = 404, description = "Não existe ou não é do usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_invoice(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    get(app_state, DocumentKind::Invoice, user, id).await
}

// DELETE /api/invoices/{id}
#[utoipa::path(
    delete,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 204, description = "Removida"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_invoice(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    delete(app_state, DocumentKind::Invoice, user, id).await
}

// =============================================================================
//  ORÇAMENTOS
// =============================================================================

// POST /api/quotations
#[utoipa::path(
    post,
    path = "/api/quotations",
    tag = "Quotations",
    request_body = CreateDocumentPayload,
    responses(
        (status = 201, description = "Orçamento criado e destinatários notificados", body = DocumentDetail),
        (status = 400, description = "Número ausente, itens negativos ou sem telefone/e-mail do destinatário"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_quotation(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateDocumentPayload>,
) -> Result<impl IntoResponse, AppError> {
    create(app_state, DocumentKind::Quotation, user, payload).await
}

// GET /api/quotations
#[utoipa::path(
    get,
    path = "/api/quotations",
    tag = "Quotations",
    responses(
        (status = 200, description = "Enviados e recebidos (type = sent | received)", body = Vec<DocumentDetail>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_quotations(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    list(app_state, DocumentKind::Quotation, user).await
}

// GET /api/quotations/{id}
#[utoipa::path(
    get,
    path = "/api/quotations/{id}",
    tag = "Quotations",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Orçamento", body = DocumentDetail),
        (status = 404, description = "Não existe ou não é do usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_quotation(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    get(app_state, DocumentKind::Quotation, user, id).await
}

// DELETE /api/quotations/{id}
#[utoipa::path(
    delete,
    path = "/api/quotations/{id}",
    tag = "Quotations",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 204, description = "Removido"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_quotation(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    delete(app_state, DocumentKind::Quotation, user, id).await
}
