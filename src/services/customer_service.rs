// src/services/customer_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        identity::{explicit_email, explicit_phone},
    },
    db::CustomerStore,
    models::customer::{CreateCustomerPayload, Customer, NewCustomer},
};

// Cores do avatar no app
const PALETTE: [&str; 8] = [
    "#4F46E5", "#0EA5E9", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#14B8A6",
];

/// Primeira letra de até duas palavras, em maiúsculas.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

/// Sempre a mesma cor para o mesmo nome.
pub fn avatar_color(name: &str) -> &'static str {
    let hash = name
        .trim()
        .to_lowercase()
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    PALETTE[(hash as usize) % PALETTE.len()]
}

#[derive(Clone)]
pub struct CustomerService {
    customers: Arc<dyn CustomerStore>,
}

impl CustomerService {
    pub fn new(customers: Arc<dyn CustomerStore>) -> Self {
        Self { customers }
    }

    pub async fn create(&self, owner: Uuid, payload: CreateCustomerPayload) -> Result<Customer, AppError> {
        let name = payload.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::invalid("Customer name is required."));
        }

        let new_customer = NewCustomer {
            phone: explicit_phone(payload.phone.as_deref())?,
            email: explicit_email(payload.email.as_deref())?,
            initials: initials(&name),
            color: avatar_color(&name).to_string(),
            name,
        };

        let customer = self.customers.insert(owner, &new_customer).await?;
        tracing::info!(user_id = %owner, customer_id = %customer.id, "Cliente criado");
        Ok(customer)
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<Customer>, AppError> {
        self.customers.list(owner).await
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<Customer, AppError> {
        self.customers
            .find_owned(owner, id)
            .await?
            .ok_or(AppError::NotFound("Customer"))
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.customers.delete_owned(owner, id).await? {
            return Err(AppError::NotFound("Customer"));
        }
        Ok(())
    }
}
