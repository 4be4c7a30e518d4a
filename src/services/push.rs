// src/services/push.rs
//
// Envio de push pelo serviço da Expo. Do ponto de vista do chamador é
// fire-and-forget: nada volta, falhas só vão para o log.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::models::message::PushMessage;

pub const DEFAULT_EXPO_PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";

// Limite de mensagens por requisição da API da Expo
const CHUNK_SIZE: usize = 100;

static EXPO_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Expo(nent)?PushToken\[[^\]]+\]$").expect("regex de token Expo válida")
});

pub fn is_expo_push_token(token: &str) -> bool {
    EXPO_TOKEN_RE.is_match(token)
}

#[async_trait]
pub trait PushSender: Send + Sync {
    /// Valida os tokens, descarta os inválidos, envia em lotes e engole erros.
    async fn send_many(&self, messages: Vec<PushMessage>);
}

#[derive(Debug, Deserialize)]
struct ExpoResponse {
    #[serde(default)]
    data: Vec<ExpoTicket>,
}

#[derive(Debug, Deserialize)]
struct ExpoTicket {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct ExpoPushClient {
    http: reqwest::Client,
    url: String,
    access_token: Option<SecretString>,
}

impl ExpoPushClient {
    pub fn new(url: String, access_token: Option<SecretString>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            access_token,
        }
    }

    async fn send_chunk(&self, chunk: &[PushMessage]) -> Result<(), reqwest::Error> {
        let mut request = self.http.post(&self.url).json(chunk);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response: ExpoResponse = request.send().await?.error_for_status()?.json().await?;

        for ticket in response.data.iter().filter(|t| t.status != "ok") {
            tracing::warn!(
                message = ticket.message.as_deref().unwrap_or("-"),
                "Expo recusou uma notificação"
            );
        }
        Ok(())
    }
}

/// Remove mensagens com token fora do formato Expo.
pub fn retain_valid_tokens(messages: Vec<PushMessage>) -> Vec<PushMessage> {
    let (valid, invalid): (Vec<_>, Vec<_>) = messages
        .into_iter()
        .partition(|m| is_expo_push_token(&m.to));
    if !invalid.is_empty() {
        tracing::debug!(dropped = invalid.len(), "Tokens de push inválidos descartados");
    }
    valid
}

#[async_trait]
impl PushSender for ExpoPushClient {
    async fn send_many(&self, messages: Vec<PushMessage>) {
        let messages = retain_valid_tokens(messages);
        if messages.is_empty() {
            return;
        }

        for chunk in messages.chunks(CHUNK_SIZE) {
            if let Err(e) = self.send_chunk(chunk).await {
                tracing::warn!(error = %e, size = chunk.len(), "Falha ao enviar lote de push");
            }
        }
    }
}
