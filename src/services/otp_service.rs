// src/services/otp_service.rs
//
// Códigos de verificação de e-mail (6 dígitos), guardados só em memória.

use std::sync::Arc;

use rand::Rng;

use crate::{
    common::{
        error::AppError,
        identity::email_for_storage,
        ttl_store::TtlStore,
    },
    services::email::Mailer,
};

pub fn generate_code() -> String {
    format!("{:06}", rand::rng().random_range(0..1_000_000))
}

#[derive(Clone)]
pub struct OtpService {
    codes: TtlStore<String, String>,
    mailer: Arc<dyn Mailer>,
}

impl OtpService {
    pub fn new(codes: TtlStore<String, String>, mailer: Arc<dyn Mailer>) -> Self {
        Self { codes, mailer }
    }

    /// Emite um código novo (o anterior deixa de valer) e envia por e-mail.
    pub async fn send(&self, email: &str) -> Result<(), AppError> {
        let email = email_for_storage(email).ok_or_else(|| AppError::invalid("Invalid email address."))?;
        let code = generate_code();

        self.codes.insert(email.clone(), code.clone()).await;

        self.mailer
            .send_verification_code(&email, &code, self.codes.ttl())
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao enviar código de verificação: {}", e))?;

        tracing::info!(to = %email, "Código de verificação emitido");
        Ok(())
    }

    /// Um código só vale uma vez. Código errado não consome o atual.
    pub async fn verify(&self, email: &str, code: &str) -> Result<(), AppError> {
        let email = email_for_storage(email).ok_or(AppError::InvalidVerificationCode)?;

        match self.codes.get(&email).await {
            Some(stored) if stored == code.trim() => {}
            _ => return Err(AppError::InvalidVerificationCode),
        }

        // Duas verificações simultâneas: só uma leva
        match self.codes.take(&email).await {
            Some(stored) if stored == code.trim() => Ok(()),
            _ => Err(AppError::InvalidVerificationCode),
        }
    }

    pub async fn purge_expired(&self) -> usize {
        self.codes.purge_expired().await
    }
}
