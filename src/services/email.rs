// src/services/email.rs
//
// E-mail transacional via SMTP (lettre) com templates Askama.
// Sem SMTP configurado o envio vira só uma linha de log.

use askama::Template;
use async_trait::async_trait;
use chrono::Duration;
use lettre::{
    message::{header::ContentType, MultiPart, SinglePart},
    transport::smtp::{authentication::Credentials, Error as SmtpError},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

#[derive(Template)]
#[template(path = "email/document_received.html")]
struct DocumentReceivedHtml<'a> {
    kind: &'a str,
    number: &'a str,
    sender: &'a str,
    total: &'a str,
}

#[derive(Template)]
#[template(path = "email/verification_code.html")]
struct VerificationCodeHtml<'a> {
    code: &'a str,
    minutes: i64,
}

#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetHtml<'a> {
    token: &'a str,
    minutes: i64,
}

/// Validade em minutos para o texto do e-mail (mínimo 1).
fn minutes(expires_in: Duration) -> i64 {
    expires_in.num_minutes().max(1)
}

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Dados do documento usados no e-mail de "você recebeu".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNotice {
    pub kind: &'static str,
    pub number: String,
    pub sender: String,
    pub total: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_document_received(&self, to: &str, notice: &DocumentNotice) -> Result<(), EmailError>;

    async fn send_verification_code(&self, to: &str, code: &str, expires_in: Duration) -> Result<(), EmailError>;

    async fn send_password_reset(&self, to: &str, token: &str, expires_in: Duration) -> Result<(), EmailError>;
}

#[derive(Clone)]
struct SmtpSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

#[derive(Clone)]
pub struct EmailService {
    smtp: Option<SmtpSender>,
}

impl EmailService {
    pub fn new(config: Option<&EmailConfig>) -> Result<Self, SmtpError> {
        let Some(config) = config else {
            tracing::warn!("SMTP não configurado; e-mails serão apenas registrados no log");
            return Ok(Self::disabled());
        };

        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            smtp: Some(SmtpSender {
                mailer,
                from_address: config.from_address.clone(),
            }),
        })
    }

    pub fn disabled() -> Self {
        Self { smtp: None }
    }

    async fn send_html(&self, to: &str, subject: &str, text: String, html: String) -> Result<(), EmailError> {
        let Some(smtp) = &self.smtp else {
            tracing::info!(to = %to, subject = %subject, "SMTP ausente, e-mail não enviado");
            return Ok(());
        };

        let email = Message::builder()
            .from(
                smtp.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(smtp.from_address.clone()))?,
            )
            .to(to.parse().map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(SinglePart::builder().header(ContentType::TEXT_PLAIN).body(text))
                    .singlepart(SinglePart::builder().header(ContentType::TEXT_HTML).body(html)),
            )?;

        smtp.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "E-mail enviado");
        Ok(())
    }
}

#[async_trait]
impl Mailer for EmailService {
    async fn send_document_received(&self, to: &str, notice: &DocumentNotice) -> Result<(), EmailError> {
        let html = DocumentReceivedHtml {
            kind: notice.kind,
            number: &notice.number,
            sender: &notice.sender,
            total: &notice.total,
        }
        .render()?;
        let text = format!(
            "{} sent you {} #{} for {}. Open the app to view it.",
            notice.sender, notice.kind, notice.number, notice.total
        );
        let subject = format!("You received a new {} from {}", notice.kind.to_lowercase(), notice.sender);

        self.send_html(to, &subject, text, html).await
    }

    async fn send_verification_code(&self, to: &str, code: &str, expires_in: Duration) -> Result<(), EmailError> {
        let minutes = minutes(expires_in);
        let html = VerificationCodeHtml { code, minutes }.render()?;
        let text = format!("Your verification code is {}. It expires in {} minutes.", code, minutes);

        self.send_html(to, "Your verification code", text, html).await
    }

    async fn send_password_reset(&self, to: &str, token: &str, expires_in: Duration) -> Result<(), EmailError> {
        let minutes = minutes(expires_in);
        let html = PasswordResetHtml { token, minutes }.render()?;
        let text = format!(
            "Use this code in the app to reset your password: {}. It expires in {} minutes.",
            token, minutes
        );

        self.send_html(to, "Reset your password", text, html).await
    }
}
