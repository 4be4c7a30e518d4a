// src/services/document_service.rs
//
// Criação, listagem e leitura de faturas/orçamentos, incluindo a visão de
// "recebidos" (documentos de outros donos endereçados ao chamador).

use std::{cmp::Reverse, collections::HashSet, sync::Arc};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        identity::{explicit_email, explicit_phone, Identity},
    },
    db::{CustomerStore, DocumentStore},
    models::{
        auth::AuthUser,
        document::{CreateDocumentPayload, Direction, DocumentDetail, DocumentKind, NewDocument, NewLineItem},
    },
    services::{
        notification_service::{NotificationService, Sender},
        profile_resolver::ProfileResolver,
    },
};

/// Itens com os padrões aplicados (qty=1, rate=0, sort_order=índice).
pub fn prepare_items(payload: &CreateDocumentPayload) -> Result<Vec<NewLineItem>, AppError> {
    payload
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let qty = item.qty.unwrap_or(Decimal::ONE);
            let rate = item.rate.unwrap_or(Decimal::ZERO);
            if qty.is_sign_negative() || rate.is_sign_negative() {
                return Err(AppError::invalid("Item quantity and rate must not be negative."));
            }
            Ok(NewLineItem {
                name: item.name.trim().to_string(),
                qty,
                rate,
                sort_order: item.sort_order.unwrap_or(index as i32),
            })
        })
        .collect()
}

/// Une enviados e recebidos: recebidos deduplicados por id e marcados como
/// `received`, tudo ordenado do mais recente para o mais antigo.
pub fn merge_views(sent: Vec<DocumentDetail>, received: Vec<DocumentDetail>) -> Vec<DocumentDetail> {
    let mut seen: HashSet<Uuid> = sent.iter().map(|d| d.id()).collect();
    let mut merged = sent;

    for mut detail in received {
        if seen.insert(detail.id()) {
            detail.document.direction = Direction::Received;
            merged.push(detail);
        }
    }

    merged.sort_by_key(|d| Reverse(d.document.sort_key()));
    merged
}

#[derive(Clone)]
pub struct DocumentService {
    documents: Arc<dyn DocumentStore>,
    customers: Arc<dyn CustomerStore>,
    resolver: ProfileResolver,
    notifications: NotificationService,
}

impl DocumentService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        customers: Arc<dyn CustomerStore>,
        resolver: ProfileResolver,
        notifications: NotificationService,
    ) -> Self {
        Self {
            documents,
            customers,
            resolver,
            notifications,
        }
    }

    pub async fn create(
        &self,
        kind: DocumentKind,
        user: &AuthUser,
        payload: CreateDocumentPayload,
    ) -> Result<DocumentDetail, AppError> {
        // 1. Validação (nada foi escrito ainda)
        let number = payload.number.trim().to_string();
        if number.is_empty() {
            return Err(AppError::invalid(format!("{} number is required.", kind.label())));
        }
        if payload.amount.is_some_and(|a| a.is_sign_negative()) {
            return Err(AppError::invalid("Amount must not be negative."));
        }
        let items = prepare_items(&payload)?;

        // 2. Identidade do destinatário: cliente, depois overrides explícitos
        let mut recipient = Identity::default();
        if let Some(customer_id) = payload.customer_id {
            let customer = self
                .customers
                .find_owned(user.id, customer_id)
                .await?
                .ok_or(AppError::NotFound("Customer"))?;
            recipient = Identity::new(customer.phone.as_deref(), customer.email.as_deref());
        }
        if let Some(phone) = explicit_phone(payload.recipient_phone.as_deref())? {
            recipient.phone = Some(phone);
        }
        if let Some(email) = explicit_email(payload.recipient_email.as_deref())? {
            recipient.email = Some(email);
        }
        if recipient.is_empty() {
            return Err(AppError::invalid(
                "Recipient phone or email is required so the document can reach its recipient.",
            ));
        }

        // 3. Documento
        let amount = payload
            .amount
            .unwrap_or_else(|| items.iter().map(|i| i.qty * i.rate).sum());
        let new_document = NewDocument {
            user_id: user.id,
            number,
            customer_id: payload.customer_id,
            recipient_phone: recipient.phone.clone(),
            recipient_email: recipient.email.clone(),
            status: payload
                .status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| kind.default_status().to_string()),
            version: payload
                .version
                .or_else(|| kind.default_version().map(str::to_string)),
            amount,
            date: payload.date,
            due_date: payload.due_date,
            notes: payload.notes,
        };
        let document = self.documents.insert(kind, &new_document).await?;

        // 4. Itens
        self.documents.insert_items(kind, document.id, &items).await?;

        // 5. Recarrega o documento completo
        let detail = self
            .documents
            .find_detail(kind, document.id)
            .await?
            .ok_or(AppError::NotFound(kind.label()))?;

        tracing::info!(
            user_id = %user.id,
            document_id = %detail.id(),
            kind = kind.tag(),
            items = detail.items.len(),
            "✅ Documento criado"
        );

        // 6. Notificações (best-effort)
        let sender_name = self.sender_name(user).await;
        self.notifications
            .fan_out(kind, &Sender { id: user.id, name: &sender_name }, &detail)
            .await;

        Ok(detail)
    }

    pub async fn list(&self, kind: DocumentKind, user: &AuthUser) -> Result<Vec<DocumentDetail>, AppError> {
        let sent = self.documents.list_owned(kind, user.id).await?;

        let identity = self.resolver.resolve(user).await;
        let received = self.list_received(kind, user.id, &identity).await;

        Ok(merge_views(sent, received))
    }

    /// Falha aqui degrada para "só enviados" em vez de derrubar a listagem.
    async fn list_received(&self, kind: DocumentKind, user_id: Uuid, identity: &Identity) -> Vec<DocumentDetail> {
        let mut received = Vec::new();

        if let Some(phone) = identity.phone.as_deref() {
            match self.documents.list_by_recipient_phone(kind, phone, user_id).await {
                Ok(docs) => received.extend(docs),
                Err(e) => tracing::warn!(%user_id, error = %e, "Falha ao buscar recebidos por telefone"),
            }
        }
        if let Some(email) = identity.email.as_deref() {
            match self.documents.list_by_recipient_email(kind, email, user_id).await {
                Ok(docs) => received.extend(docs),
                Err(e) => tracing::warn!(%user_id, error = %e, "Falha ao buscar recebidos por e-mail"),
            }
        }
        received
    }

    pub async fn get(&self, kind: DocumentKind, user: &AuthUser, id: Uuid) -> Result<DocumentDetail, AppError> {
        let mut detail = self
            .documents
            .find_detail(kind, id)
            .await?
            .ok_or(AppError::NotFound(kind.label()))?;

        if detail.document.user_id == user.id {
            return Ok(detail);
        }

        // Não é o dono: só vê se o documento foi endereçado a ele
        let identity = self.resolver.resolve(user).await;
        let doc = &detail.document;
        if !identity.matches(doc.recipient_phone.as_deref(), doc.recipient_email.as_deref()) {
            return Err(AppError::NotFound(kind.label()));
        }

        detail.document.direction = Direction::Received;
        Ok(detail)
    }

    pub async fn delete(&self, kind: DocumentKind, user: &AuthUser, id: Uuid) -> Result<(), AppError> {
        if !self.documents.delete_owned(kind, user.id, id).await? {
            return Err(AppError::NotFound(kind.label()));
        }
        Ok(())
    }

    async fn sender_name(&self, user: &AuthUser) -> String {
        let (_, profile) = self.resolver.resolve_with_profile(user).await;
        profile
            .and_then(|p| p.full_name)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| user.display_name())
    }
}
