// src/db/stores.rs
//
// Contratos de persistência usados pelos serviços. As implementações reais
// (Postgres/Supabase) estão nos *_repo.rs; os testes usam fakes em memória.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        customer::{Customer, NewCustomer},
        document::{DocumentDetail, DocumentKind, NewDocument, NewLineItem, Document},
        message::{Message, NewMessage},
        profile::{NewProfile, Profile, ProfileChanges},
    },
};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError>;

    /// Upsert pela PK: se um trigger já criou a linha, só preenche o que estiver vazio.
    async fn create(&self, profile: &NewProfile) -> Result<(), AppError>;

    /// Preenche phone/email apenas onde a linha ainda está NULL.
    async fn fill_missing(
        &self,
        id: Uuid,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), AppError>;

    async fn update(&self, id: Uuid, changes: &ProfileChanges) -> Result<Profile, AppError>;

    async fn set_push_token(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError>;

    async fn ids_by_phone(&self, phone: &str) -> Result<Vec<Uuid>, AppError>;

    /// `phone LIKE '%' || $1`
    async fn ids_by_phone_suffix(&self, phone: &str) -> Result<Vec<Uuid>, AppError>;

    /// Comparação sem diferenciar maiúsculas.
    async fn ids_by_email(&self, email: &str) -> Result<Vec<Uuid>, AppError>;

    /// (id, token) para os perfis que têm token cadastrado.
    async fn push_tokens(&self, ids: &[Uuid]) -> Result<Vec<(Uuid, String)>, AppError>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn insert(&self, owner: Uuid, customer: &NewCustomer) -> Result<Customer, AppError>;

    async fn list(&self, owner: Uuid) -> Result<Vec<Customer>, AppError>;

    async fn find_owned(&self, owner: Uuid, id: Uuid) -> Result<Option<Customer>, AppError>;

    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, kind: DocumentKind, document: &NewDocument) -> Result<Document, AppError>;

    async fn insert_items(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
        items: &[NewLineItem],
    ) -> Result<(), AppError>;

    /// Documento + cliente + itens numa só chamada.
    async fn find_detail(&self, kind: DocumentKind, id: Uuid) -> Result<Option<DocumentDetail>, AppError>;

    async fn list_owned(&self, kind: DocumentKind, owner: Uuid) -> Result<Vec<DocumentDetail>, AppError>;

    /// Documentos de outros donos cujo recipient_phone é igual ou termina com `phone`.
    async fn list_by_recipient_phone(
        &self,
        kind: DocumentKind,
        phone: &str,
        exclude_owner: Uuid,
    ) -> Result<Vec<DocumentDetail>, AppError>;

    /// Documentos de outros donos cujo recipient_email bate sem diferenciar maiúsculas.
    async fn list_by_recipient_email(
        &self,
        kind: DocumentKind,
        email: &str,
        exclude_owner: Uuid,
    ) -> Result<Vec<DocumentDetail>, AppError>;

    async fn delete_owned(&self, kind: DocumentKind, owner: Uuid, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert(&self, message: &NewMessage) -> Result<Message, AppError>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Message>, AppError>;

    async fn mark_read(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}
