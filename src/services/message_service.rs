// src/services/message_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{common::error::AppError, db::MessageStore, models::message::Message};

#[derive(Clone)]
pub struct MessageService {
    messages: Arc<dyn MessageStore>,
}

impl MessageService {
    pub fn new(messages: Arc<dyn MessageStore>) -> Self {
        Self { messages }
    }

    pub async fn inbox(&self, user_id: Uuid) -> Result<Vec<Message>, AppError> {
        self.messages.list_for_user(user_id).await
    }

    pub async fn mark_read(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.messages.mark_read(user_id, id).await? {
            return Err(AppError::NotFound("Message"));
        }
        Ok(())
    }
}
