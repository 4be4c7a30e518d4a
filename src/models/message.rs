// src/models/message.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Notificação in-app. Criada só pelo fan-out; a única alteração é `unread`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Message {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "New Invoice from Asha")]
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[schema(example = "document-text")]
    pub icon: String,
    #[schema(example = "#2563EB")]
    pub icon_color: String,
    pub unread: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub icon_color: String,
}

/// Uma notificação push para um token Expo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PushData>,
    pub sound: &'static str,
}

/// Envelope que o app usa para abrir o documento ao tocar na notificação.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushData {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: Uuid,
}
