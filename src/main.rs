//src/main.rs

use std::time::Duration;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;
#[cfg(test)]
mod testing;

use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

// Intervalo da limpeza dos códigos e tokens expirados
const TOKEN_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar
    let settings = Settings::from_env()?;
    let app_state = AppState::new(&settings).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    spawn_token_purge(app_state.clone());

    // Rotas públicas
    let auth_routes = Router::new()
        .route("/otp/send", post(handlers::auth::send_otp))
        .route("/otp/verify", post(handlers::auth::verify_otp))
        .route("/password/forgot", post(handlers::auth::forgot_password))
        .route("/password/redeem", post(handlers::auth::redeem_reset_token));

    // Rotas protegidas pelo token do Supabase
    let protected_routes = Router::new()
        .route(
            "/api/profile",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        .route("/api/profile/push-token", put(handlers::profile::update_push_token))
        .route(
            "/api/customers",
            post(handlers::customers::create_customer).get(handlers::customers::list_customers),
        )
        .route(
            "/api/customers/{id}",
            get(handlers::customers::get_customer).delete(handlers::customers::delete_customer),
        )
        .route(
            "/api/invoices",
            post(handlers::documents::create_invoice).get(handlers::documents::list_invoices),
        )
        .route(
            "/api/invoices/{id}",
            get(handlers::documents::get_invoice).delete(handlers::documents::delete_invoice),
        )
        .route(
            "/api/quotations",
            post(handlers::documents::create_quotation).get(handlers::documents::list_quotations),
        )
        .route(
            "/api/quotations/{id}",
            get(handlers::documents::get_quotation).delete(handlers::documents::delete_quotation),
        )
        .route("/api/messages", get(handlers::messages::list_messages))
        .route("/api/messages/{id}/read", patch(handlers::messages::mark_message_read))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(settings.socket_addr()).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn spawn_token_purge(app_state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TOKEN_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let codes = app_state.otp_service.purge_expired().await;
            let reset_tokens = app_state.password_reset_service.purge_expired().await;
            if codes + reset_tokens > 0 {
                tracing::debug!(codes, reset_tokens, "Códigos e tokens expirados removidos");
            }
        }
    });
}
