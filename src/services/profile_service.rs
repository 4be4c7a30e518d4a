// src/services/profile_service.rs

use std::sync::Arc;

use crate::{
    common::{
        error::AppError,
        identity::{explicit_email, explicit_phone},
    },
    db::ProfileStore,
    models::{
        auth::AuthUser,
        profile::{Profile, ProfileChanges, UpdateProfilePayload},
    },
    services::{profile_resolver::ProfileResolver, push::is_expo_push_token},
};

#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileStore>,
    resolver: ProfileResolver,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileStore>, resolver: ProfileResolver) -> Self {
        Self { profiles, resolver }
    }

    /// Perfil do chamador. Se a linha ainda não existir (sync falhou),
    /// devolve um perfil montado a partir do token.
    pub async fn me(&self, user: &AuthUser) -> Result<Profile, AppError> {
        let identity = self.resolver.resolve(user).await;

        if let Some(profile) = self.profiles.find_by_id(user.id).await? {
            return Ok(profile);
        }

        Ok(Profile {
            id: user.id,
            full_name: user.user_metadata.full_name.clone(),
            phone: identity.phone,
            email: identity.email,
            avatar_url: None,
            pincode: None,
            expo_push_token: None,
            created_at: None,
            updated_at: None,
        })
    }

    pub async fn update(&self, user: &AuthUser, payload: UpdateProfilePayload) -> Result<Profile, AppError> {
        // Garante que a linha existe antes do UPDATE
        self.resolver.resolve(user).await;

        let changes = ProfileChanges {
            full_name: payload
                .full_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            phone: explicit_phone(payload.phone.as_deref())?,
            email: explicit_email(payload.email.as_deref())?,
            avatar_url: payload.avatar_url.filter(|u| !u.trim().is_empty()),
            pincode: payload.pincode.filter(|p| !p.trim().is_empty()),
        };

        let profile = self.profiles.update(user.id, &changes).await?;
        tracing::info!(user_id = %user.id, "Perfil atualizado");
        Ok(profile)
    }

    /// `None` limpa o token (logout no app).
    pub async fn set_push_token(&self, user: &AuthUser, token: Option<&str>) -> Result<(), AppError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        if let Some(t) = token {
            if !is_expo_push_token(t) {
                return Err(AppError::invalid("Invalid Expo push token."));
            }
        }

        self.resolver.resolve(user).await;
        self.profiles.set_push_token(user.id, token).await?;
        tracing::debug!(user_id = %user.id, registered = token.is_some(), "Token de push atualizado");
        Ok(())
    }
}
