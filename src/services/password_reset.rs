// src/services/password_reset.rs
//
// Tokens de redefinição de senha, guardados só em memória. A troca da senha
// em si fica com o Supabase; aqui só se emite e se resgata o token.

use std::sync::Arc;

use chrono::Duration;
use rand::{distr::Alphanumeric, Rng};

use crate::{
    common::{
        error::AppError,
        identity::email_for_storage,
        ttl_store::{Clock, SystemClock, TtlStore},
    },
    services::email::Mailer,
};

const TOKEN_LEN: usize = 32;

pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[derive(Clone)]
pub struct PasswordResetService {
    // token -> e-mail
    tokens: TtlStore<String, String>,
    // e-mail -> token vigente
    issued: TtlStore<String, String>,
    mailer: Arc<dyn Mailer>,
}

impl PasswordResetService {
    pub fn new(ttl: Duration, mailer: Arc<dyn Mailer>) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock), mailer)
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            tokens: TtlStore::with_clock(ttl, clock.clone()),
            issued: TtlStore::with_clock(ttl, clock),
            mailer,
        }
    }

    /// Emite um token novo para o e-mail. O anterior deixa de valer.
    pub async fn issue(&self, email: &str) -> Result<(), AppError> {
        let email = email_for_storage(email).ok_or_else(|| AppError::invalid("Invalid email address."))?;
        let token = generate_token();

        if let Some(previous) = self.issued.take(&email).await {
            self.tokens.remove(&previous).await;
        }
        self.tokens.insert(token.clone(), email.clone()).await;
        self.issued.insert(email.clone(), token.clone()).await;

        self.mailer
            .send_password_reset(&email, &token, self.tokens.ttl())
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao enviar token de redefinição: {}", e))?;

        tracing::info!(to = %email, "Token de redefinição de senha emitido");
        Ok(())
    }

    /// Resgata o token uma única vez e devolve o e-mail a que ele pertence.
    pub async fn redeem(&self, token: &str) -> Result<String, AppError> {
        let token = token.trim().to_string();
        let email = self
            .tokens
            .take(&token)
            .await
            .ok_or(AppError::InvalidResetToken)?;

        if self.issued.get(&email).await.as_deref() == Some(token.as_str()) {
            self.issued.remove(&email).await;
        }

        tracing::info!(email = %email, "Token de redefinição de senha resgatado");
        Ok(email)
    }

    pub async fn purge_expired(&self) -> usize {
        self.issued.purge_expired().await;
        self.tokens.purge_expired().await
    }
}
