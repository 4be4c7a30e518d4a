// src/services/profile_resolver.rs
//
// Identidade canônica do chamador. Duas fases: ler e calcular (puro),
// depois reconciliar o perfil salvo (best-effort, nunca falha a requisição).

use std::sync::Arc;

use crate::{
    common::identity::{email_for_storage, phone_for_storage, Identity},
    db::ProfileStore,
    models::{
        auth::AuthUser,
        profile::{NewProfile, Profile},
    },
};

/// Escrita corretiva a fazer no perfil.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSync {
    Noop,
    Create(NewProfile),
    Fill {
        phone: Option<String>,
        email: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Unchanged,
    Created,
    Filled,
    Failed,
}

/// Identidade vinda só do provedor de auth: metadados primeiro, depois os campos principais.
pub fn auth_identity(user: &AuthUser) -> Identity {
    let meta = &user.user_metadata;
    Identity {
        phone: meta
            .phone
            .as_deref()
            .and_then(phone_for_storage)
            .or_else(|| user.phone.as_deref().and_then(phone_for_storage)),
        email: meta
            .email
            .as_deref()
            .and_then(email_for_storage)
            .or_else(|| user.email.as_deref().and_then(email_for_storage)),
    }
}

/// O perfil salvo só entra quando o token não traz o campo.
pub fn resolve_identity(user: &AuthUser, profile: Option<&Profile>) -> Identity {
    let from_auth = auth_identity(user);
    Identity {
        phone: from_auth.phone.or_else(|| {
            profile
                .and_then(|p| p.phone.as_deref())
                .and_then(phone_for_storage)
        }),
        email: from_auth.email.or_else(|| {
            profile
                .and_then(|p| p.email.as_deref())
                .and_then(email_for_storage)
        }),
    }
}

pub fn plan_sync(user: &AuthUser, profile: Option<&Profile>) -> ProfileSync {
    let from_auth = auth_identity(user);

    let Some(profile) = profile else {
        return ProfileSync::Create(NewProfile {
            id: user.id,
            full_name: user
                .user_metadata
                .full_name
                .clone()
                .filter(|n| !n.trim().is_empty()),
            phone: from_auth.phone,
            email: from_auth.email,
        });
    };

    // Vazio ou fora da forma canônica conta como ausente
    let stored_phone = profile.phone.as_deref().and_then(phone_for_storage);
    let stored_email = profile.email.as_deref().and_then(email_for_storage);
    let phone = from_auth.phone.filter(|_| stored_phone.is_none());
    let email = from_auth.email.filter(|_| stored_email.is_none());

    if phone.is_none() && email.is_none() {
        ProfileSync::Noop
    } else {
        ProfileSync::Fill { phone, email }
    }
}

#[derive(Clone)]
pub struct ProfileResolver {
    profiles: Arc<dyn ProfileStore>,
}

impl ProfileResolver {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }

    pub async fn resolve(&self, user: &AuthUser) -> Identity {
        self.resolve_with_profile(user).await.0
    }

    /// Como `resolve`, mas devolve também o perfil lido (antes da reconciliação).
    pub async fn resolve_with_profile(&self, user: &AuthUser) -> (Identity, Option<Profile>) {
        let profile = match self.profiles.find_by_id(user.id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Falha ao ler perfil; usando só o token");
                return (auth_identity(user), None);
            }
        };

        let identity = resolve_identity(user, profile.as_ref());
        self.reconcile(user, profile.as_ref()).await;
        (identity, profile)
    }

    pub async fn reconcile(&self, user: &AuthUser, profile: Option<&Profile>) -> SyncOutcome {
        let outcome = match plan_sync(user, profile) {
            ProfileSync::Noop => return SyncOutcome::Unchanged,
            ProfileSync::Create(new_profile) => self
                .profiles
                .create(&new_profile)
                .await
                .map(|_| SyncOutcome::Created),
            ProfileSync::Fill { phone, email } => self
                .profiles
                .fill_missing(user.id, phone.as_deref(), email.as_deref())
                .await
                .map(|_| SyncOutcome::Filled),
        };

        match outcome {
            Ok(outcome) => {
                tracing::debug!(user_id = %user.id, ?outcome, "Perfil sincronizado com o auth");
                outcome
            }
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Sync do perfil falhou (ignorado)");
                SyncOutcome::Failed
            }
        }
    }
}
