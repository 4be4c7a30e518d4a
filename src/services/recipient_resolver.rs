// src/services/recipient_resolver.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{common::error::AppError, common::identity::Identity, db::ProfileStore};

/// Quem, entre os usuários cadastrados, é o destinatário de um documento.
/// Só leitura; zero resultados é normal (o destinatário ainda não se cadastrou).
#[derive(Clone)]
pub struct RecipientResolver {
    profiles: Arc<dyn ProfileStore>,
}

impl RecipientResolver {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }

    pub async fn find_receivers(&self, recipient: &Identity, exclude: Uuid) -> Result<Vec<Uuid>, AppError> {
        let mut matches = Vec::new();

        if let Some(phone) = recipient.phone.as_deref() {
            matches.extend(self.profiles.ids_by_phone(phone).await?);
            // Perfis antigos guardaram o telefone cru (ex: com +91)
            matches.extend(self.profiles.ids_by_phone_suffix(phone).await?);
        }
        if let Some(email) = recipient.email.as_deref() {
            matches.extend(self.profiles.ids_by_email(email).await?);
        }

        // Dedup mantendo a ordem de descoberta
        let mut receivers: Vec<Uuid> = Vec::with_capacity(matches.len());
        for id in matches {
            if id != exclude && !receivers.contains(&id) {
                receivers.push(id);
            }
        }
        Ok(receivers)
    }
}
