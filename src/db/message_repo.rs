// src/db/message_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::stores::MessageStore,
    models::message::{Message, NewMessage},
};

#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn insert(&self, message: &NewMessage) -> Result<Message, AppError> {
        let created = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (user_id, title, description, timestamp, icon, icon_color, unread)
            VALUES ($1, $2, $3, NOW(), $4, $5, TRUE)
            RETURNING id, user_id, title, description, timestamp, icon, icon_color, unread
            "#,
        )
        .bind(message.user_id)
        .bind(&message.title)
        .bind(&message.description)
        .bind(&message.icon)
        .bind(&message.icon_color)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, user_id, title, description, timestamp, icon, icon_color, unread
            FROM messages
            WHERE user_id = $1
            ORDER BY timestamp DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn mark_read(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE messages SET unread = FALSE WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
