// src/config.rs
//
// Variáveis de ambiente (carregadas de .env se existir):
//   obrigatórias: DATABASE_URL, SUPABASE_JWT_SECRET
//   opcionais:    APP_HOST (0.0.0.0), APP_PORT (3000), DB_MAX_CONNECTIONS (5),
//                 SMTP_HOST, SMTP_PORT (587), SMTP_USERNAME, SMTP_PASSWORD, SMTP_FROM,
//                 EXPO_PUSH_URL, EXPO_ACCESS_TOKEN, OTP_TTL_SECS (600),
//                 RESET_TOKEN_TTL_SECS (900)

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use secrecy::{ExposeSecret, SecretString};
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

use crate::{
    common::ttl_store::TtlStore,
    db::{CustomerRepository, DocumentRepository, MessageRepository, ProfileRepository},
    services::{
        auth::AuthService,
        customer_service::CustomerService,
        document_service::DocumentService,
        email::EmailService,
        message_service::MessageService,
        notification_service::NotificationService,
        otp_service::OtpService,
        password_reset::PasswordResetService,
        profile_resolver::ProfileResolver,
        profile_service::ProfileService,
        push::{ExpoPushClient, DEFAULT_EXPO_PUSH_URL},
        recipient_resolver::RecipientResolver,
    },
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Variável de ambiente ausente: {0}")]
    MissingEnvVar(&'static str),
    #[error("Variável de ambiente inválida {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    pub from_address: String,
}

#[derive(Clone)]
pub struct Settings {
    pub database_url: SecretString,
    pub jwt_secret: SecretString,
    pub host: IpAddr,
    pub port: u16,
    pub db_max_connections: u32,
    // None = e-mails só no log
    pub email: Option<EmailConfig>,
    pub expo_push_url: String,
    pub expo_access_token: Option<SecretString>,
    pub otp_ttl: chrono::Duration,
    pub reset_token_ttl: chrono::Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::MissingEnvVar(key));

        let email = match (
            get("SMTP_HOST"),
            get("SMTP_USERNAME"),
            get("SMTP_PASSWORD"),
            get("SMTP_FROM"),
        ) {
            (Some(smtp_host), Some(smtp_username), Some(smtp_password), Some(from_address)) => Some(EmailConfig {
                smtp_host,
                smtp_port: parse_or("SMTP_PORT", get("SMTP_PORT"), 587)?,
                smtp_username,
                smtp_password: SecretString::from(smtp_password),
                from_address,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: SecretString::from(required("DATABASE_URL")?),
            jwt_secret: SecretString::from(required("SUPABASE_JWT_SECRET")?),
            host: parse_or("APP_HOST", get("APP_HOST"), IpAddr::from([0, 0, 0, 0]))?,
            port: parse_or("APP_PORT", get("APP_PORT"), 3000)?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 5)?,
            email,
            expo_push_url: get("EXPO_PUSH_URL").unwrap_or_else(|| DEFAULT_EXPO_PUSH_URL.to_string()),
            expo_access_token: get("EXPO_ACCESS_TOKEN").map(SecretString::from),
            otp_ttl: chrono::Duration::seconds(parse_or("OTP_TTL_SECS", get("OTP_TTL_SECS"), 600)?),
            reset_token_ttl: chrono::Duration::seconds(parse_or(
                "RESET_TOKEN_TTL_SECS",
                get("RESET_TOKEN_TTL_SECS"),
                900,
            )?),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key, e.to_string())),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub profile_service: ProfileService,
    pub customer_service: CustomerService,
    pub document_service: DocumentService,
    pub message_service: MessageService,
    pub otp_service: OtpService,
    pub password_reset_service: PasswordResetService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(settings.database_url.expose_secret())
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let profiles = Arc::new(ProfileRepository::new(db_pool.clone()));
        let customers = Arc::new(CustomerRepository::new(db_pool.clone()));
        let documents = Arc::new(DocumentRepository::new(db_pool.clone()));
        let messages = Arc::new(MessageRepository::new(db_pool.clone()));

        let mailer = Arc::new(EmailService::new(settings.email.as_ref())?);
        let push = Arc::new(ExpoPushClient::new(
            settings.expo_push_url.clone(),
            settings.expo_access_token.clone(),
        ));

        let resolver = ProfileResolver::new(profiles.clone());
        let notifications = NotificationService::new(
            profiles.clone(),
            messages.clone(),
            RecipientResolver::new(profiles.clone()),
            push,
            mailer.clone(),
        );

        Ok(Self {
            auth_service: AuthService::new(settings.jwt_secret.clone()),
            profile_service: ProfileService::new(profiles, resolver.clone()),
            customer_service: CustomerService::new(customers.clone()),
            document_service: DocumentService::new(documents, customers, resolver, notifications),
            message_service: MessageService::new(messages),
            otp_service: OtpService::new(TtlStore::new(settings.otp_ttl), mailer.clone()),
            password_reset_service: PasswordResetService::new(settings.reset_token_ttl, mailer),
            db_pool,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/invoices"),
        ("SUPABASE_JWT_SECRET", "jwt-secret"),
    ];

    #[test]
    fn defaults_apply() {
        let settings = Settings::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.db_max_connections, 5);
        assert_eq!(settings.otp_ttl, chrono::Duration::minutes(10));
        assert_eq!(settings.reset_token_ttl, chrono::Duration::minutes(15));
        assert_eq!(settings.expo_push_url, DEFAULT_EXPO_PUSH_URL);
        assert!(settings.email.is_none());
        assert_eq!(settings.socket_addr().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let result = Settings::from_lookup(lookup(&[("SUPABASE_JWT_SECRET", "x")]));
        assert!(matches!(result, Err(ConfigError::MissingEnvVar("DATABASE_URL"))));
    }

    #[test]
    fn bad_port_is_an_error() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("APP_PORT", "not-a-port"));
        assert!(matches!(
            Settings::from_lookup(lookup(&pairs)),
            Err(ConfigError::InvalidEnvVar("APP_PORT", _))
        ));
    }

    #[test]
    fn email_needs_every_smtp_field() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_USERNAME", "mailer"),
            ("SMTP_PASSWORD", "pw"),
        ]);
        assert!(Settings::from_lookup(lookup(&pairs)).unwrap().email.is_none());

        pairs.push(("SMTP_FROM", "no-reply@example.com"));
        let email = Settings::from_lookup(lookup(&pairs)).unwrap().email.unwrap();
        assert_eq!(email.smtp_port, 587);
        assert_eq!(email.from_address, "no-reply@example.com");
    }
}
