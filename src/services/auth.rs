// src/services/auth.rs
//
// O login acontece no Supabase; aqui só validamos o access token que o app envia.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    common::error::AppError,
    models::auth::{AuthUser, Claims},
};

const SUPABASE_AUDIENCE: &str = "authenticated";

#[derive(Clone)]
pub struct AuthService {
    jwt_secret: SecretString,
}

impl AuthService {
    pub fn new(jwt_secret: SecretString) -> Self {
        Self { jwt_secret }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthUser, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[SUPABASE_AUDIENCE]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.expose_secret().as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Token rejeitado");
            AppError::InvalidToken
        })?;

        Ok(AuthUser::from(token_data.claims))
    }
}
