// src/services/notification_service.rs
//
// Fan-out de um documento recém-criado: mensagem in-app, push e e-mail.
// Cada canal é opcional e independente; toda falha é logada e engolida.
// Entrega at-most-once: não há retry.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::identity::{email_for_storage, Identity},
    db::{MessageStore, ProfileStore},
    models::{
        document::{DocumentDetail, DocumentKind},
        message::{NewMessage, PushData, PushMessage},
    },
    services::{
        email::{DocumentNotice, Mailer},
        push::PushSender,
        recipient_resolver::RecipientResolver,
    },
};

const SENT_ICON: &str = "paper-plane";
const SENT_COLOR: &str = "#16A34A";
const RECEIVED_ICON: &str = "document-text";
const RECEIVED_COLOR: &str = "#2563EB";

pub fn format_amount(amount: Decimal) -> String {
    format!("₹{:.2}", amount.round_dp(2))
}

/// O que aconteceu no fan-out (só para log e testes; nunca vira erro HTTP).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FanOutReport {
    pub sender_notified: bool,
    pub receivers: Vec<Uuid>,
    pub receiver_messages: usize,
    pub pushes: usize,
    pub email_sent: bool,
}

/// Quem enviou, como aparece para os outros.
pub struct Sender<'a> {
    pub id: Uuid,
    pub name: &'a str,
}

#[derive(Clone)]
pub struct NotificationService {
    profiles: Arc<dyn ProfileStore>,
    messages: Arc<dyn MessageStore>,
    recipients: RecipientResolver,
    push: Arc<dyn PushSender>,
    mailer: Arc<dyn Mailer>,
}

impl NotificationService {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        messages: Arc<dyn MessageStore>,
        recipients: RecipientResolver,
        push: Arc<dyn PushSender>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            profiles,
            messages,
            recipients,
            push,
            mailer,
        }
    }

    pub async fn fan_out(&self, kind: DocumentKind, sender: &Sender<'_>, detail: &DocumentDetail) -> FanOutReport {
        let mut report = FanOutReport::default();
        let doc = &detail.document;
        let label = kind.label();
        let total = format_amount(detail.total);
        let recipient_name = detail
            .customer
            .as_ref()
            .map(|c| c.name.clone())
            .or_else(|| doc.recipient_phone.clone())
            .or_else(|| doc.recipient_email.clone())
            .unwrap_or_else(|| "your customer".to_string());

        // 1. Mensagem para quem enviou
        let sent_title = format!("{} sent", label);
        let sent_body = format!("You sent {} #{} to {} ({})", label, doc.number, recipient_name, total);
        let sender_message = NewMessage {
            user_id: sender.id,
            title: sent_title.clone(),
            description: sent_body.clone(),
            icon: SENT_ICON.to_string(),
            icon_color: SENT_COLOR.to_string(),
        };
        match self.messages.insert(&sender_message).await {
            Ok(_) => report.sender_notified = true,
            Err(e) => tracing::warn!(user_id = %sender.id, error = %e, "Falha ao criar mensagem do remetente"),
        }

        // 2. Destinatários cadastrados
        let recipient = Identity {
            phone: doc.recipient_phone.clone(),
            email: doc.recipient_email.clone(),
        };
        report.receivers = match self.recipients.find_receivers(&recipient, sender.id).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(document_id = %doc.id, error = %e, "Falha ao resolver destinatários");
                Vec::new()
            }
        };

        let received_title = format!("New {} from {}", label, sender.name);
        let received_body = format!("{} #{} for {}", label, doc.number, total);
        for receiver in &report.receivers {
            let message = NewMessage {
                user_id: *receiver,
                title: received_title.clone(),
                description: received_body.clone(),
                icon: RECEIVED_ICON.to_string(),
                icon_color: RECEIVED_COLOR.to_string(),
            };
            match self.messages.insert(&message).await {
                Ok(_) => report.receiver_messages += 1,
                Err(e) => tracing::warn!(user_id = %receiver, error = %e, "Falha ao criar mensagem do destinatário"),
            }
        }

        // 3. Push (um único envio em lote)
        let mut audience = Vec::with_capacity(report.receivers.len() + 1);
        audience.push(sender.id);
        audience.extend(report.receivers.iter().copied());

        let tokens = match self.profiles.push_tokens(&audience).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(error = %e, "Falha ao buscar tokens de push");
                Vec::new()
            }
        };
        let data = PushData {
            kind: kind.tag().to_string(),
            id: doc.id,
        };
        let pushes: Vec<PushMessage> = tokens
            .into_iter()
            .map(|(user_id, token)| {
                let (title, body) = if user_id == sender.id {
                    (sent_title.clone(), sent_body.clone())
                } else {
                    (received_title.clone(), received_body.clone())
                };
                PushMessage {
                    to: token,
                    title,
                    body,
                    data: Some(data.clone()),
                    sound: "default",
                }
            })
            .collect();
        report.pushes = pushes.len();
        if !pushes.is_empty() {
            self.push.send_many(pushes).await;
        }

        // 4. E-mail para o cliente, se o endereço for válido
        let customer_email = detail
            .customer
            .as_ref()
            .and_then(|c| c.email.as_deref())
            .and_then(email_for_storage);
        if let Some(to) = customer_email {
            let notice = DocumentNotice {
                kind: label,
                number: doc.number.clone(),
                sender: sender.name.to_string(),
                total,
            };
            match self.mailer.send_document_received(&to, &notice).await {
                Ok(()) => report.email_sent = true,
                Err(e) => tracing::warn!(to = %to, error = %e, "Falha ao enviar e-mail do documento"),
            }
        }

        tracing::info!(
            document_id = %doc.id,
            receivers = report.receivers.len(),
            pushes = report.pushes,
            email = report.email_sent,
            "📨 Notificações do documento disparadas"
        );
        report
    }
}
