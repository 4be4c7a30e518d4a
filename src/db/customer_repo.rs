// src/db/customer_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::stores::CustomerStore,
    models::customer::{Customer, NewCustomer},
};

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for CustomerRepository {
    async fn insert(&self, owner: Uuid, customer: &NewCustomer) -> Result<Customer, AppError> {
        let created = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (user_id, name, phone, email, initials, color)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, name, phone, email, initials, color, created_at
            "#,
        )
        .bind(owner)
        .bind(&customer.name)
        .bind(customer.phone.as_deref())
        .bind(customer.email.as_deref())
        .bind(&customer.initials)
        .bind(&customer.color)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list(&self, owner: Uuid) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, user_id, name, phone, email, initials, color, created_at
            FROM customers
            WHERE user_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    async fn find_owned(&self, owner: Uuid, id: Uuid) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, user_id, name, phone, email, initials, color, created_at
            FROM customers
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
