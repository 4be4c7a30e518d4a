// src/testing.rs
//
// Fakes em memória dos stores e das integrações externas, para testar os
// serviços sem Postgres, Expo ou SMTP.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        identity::{email_for_storage, phone_for_storage},
    },
    db::{CustomerStore, DocumentStore, MessageStore, ProfileStore},
    models::{
        auth::{AuthUser, UserMetadata},
        customer::{Customer, NewCustomer},
        document::{Document, DocumentDetail, DocumentKind, LineItem, NewDocument, NewLineItem},
        message::{Message, NewMessage, PushMessage},
        profile::{NewProfile, Profile, ProfileChanges},
    },
    services::{
        customer_service::CustomerService,
        document_service::DocumentService,
        email::{DocumentNotice, EmailError, Mailer},
        notification_service::NotificationService,
        profile_resolver::ProfileResolver,
        push::PushSender,
        recipient_resolver::RecipientResolver,
    },
};

fn db_down() -> AppError {
    AppError::DatabaseError(sqlx::Error::PoolTimedOut)
}

/// Mesma regra do CASE no repositório: só sobrescreve o que não tem forma canônica.
fn heal(stored: &mut Option<String>, from_auth: Option<&str>, canonical: fn(&str) -> Option<String>) {
    if stored.as_deref().and_then(canonical).is_none() {
        if let Some(value) = from_auth {
            *stored = Some(value.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Construtores
// ---------------------------------------------------------------------------

pub fn profile(id: Uuid, phone: Option<&str>, email: Option<&str>) -> Profile {
    Profile {
        id,
        full_name: None,
        phone: phone.map(str::to_string),
        email: email.map(str::to_string),
        avatar_url: None,
        pincode: None,
        expo_push_token: None,
        created_at: Some(Utc::now()),
        updated_at: None,
    }
}

pub fn profile_with_token(id: Uuid, phone: Option<&str>, email: Option<&str>) -> Profile {
    Profile {
        expo_push_token: Some(format!("ExponentPushToken[{}]", id)),
        ..profile(id, phone, email)
    }
}

pub fn auth_user(phone: Option<&str>, email: Option<&str>) -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        email: email.map(str::to_string),
        phone: phone.map(str::to_string),
        user_metadata: UserMetadata::default(),
    }
}

/// Documento já persistido, com cliente quando `customer_email` vem preenchido.
pub fn detail_for(
    owner: Uuid,
    recipient_phone: Option<&str>,
    recipient_email: Option<&str>,
    customer_email: Option<&str>,
) -> DocumentDetail {
    let customer = customer_email.map(|email| Customer {
        id: Uuid::new_v4(),
        user_id: owner,
        name: "Bharat Stores".into(),
        phone: recipient_phone.map(str::to_string),
        email: Some(email.to_string()),
        initials: Some("BS".into()),
        color: Some("#4F46E5".into()),
        created_at: Some(Utc::now()),
    });
    let document = Document {
        id: Uuid::new_v4(),
        user_id: owner,
        number: "INV-001".into(),
        customer_id: customer.as_ref().map(|c| c.id),
        recipient_phone: recipient_phone.map(str::to_string),
        recipient_email: recipient_email.map(str::to_string),
        status: "pending".into(),
        version: None,
        amount: Some(Decimal::new(250, 0)),
        date: NaiveDate::from_ymd_opt(2024, 5, 1),
        due_date: None,
        notes: None,
        direction: Default::default(),
        created_at: Some(Utc::now()),
    };
    let items = vec![LineItem {
        id: Uuid::new_v4(),
        document_id: document.id,
        name: "Widget".into(),
        qty: Decimal::new(1, 0),
        rate: Decimal::new(250, 0),
        sort_order: 0,
    }];
    DocumentDetail::new(document, customer, items)
}

// ---------------------------------------------------------------------------
// Perfis
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeProfileStore {
    rows: Mutex<HashMap<Uuid, Profile>>,
    writes: Mutex<usize>,
    lookups: Mutex<usize>,
    failing_writes: Mutex<bool>,
    failing_reads: Mutex<bool>,
}

impl FakeProfileStore {
    pub fn put(&self, profile: Profile) {
        self.rows.lock().unwrap().insert(profile.id, profile);
    }

    pub fn get(&self, id: Uuid) -> Option<Profile> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    /// Quantas vezes um perfil foi lido por id.
    pub fn lookup_count(&self) -> usize {
        *self.lookups.lock().unwrap()
    }

    pub fn fail_writes(&self, fail: bool) {
        *self.failing_writes.lock().unwrap() = fail;
    }

    pub fn fail_reads(&self, fail: bool) {
        *self.failing_reads.lock().unwrap() = fail;
    }

    fn write(&self) -> Result<(), AppError> {
        if *self.failing_writes.lock().unwrap() {
            return Err(db_down());
        }
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }

    fn read(&self) -> Result<(), AppError> {
        if *self.failing_reads.lock().unwrap() {
            return Err(db_down());
        }
        Ok(())
    }

    fn ids_where(&self, pred: impl Fn(&Profile) -> bool) -> Result<Vec<Uuid>, AppError> {
        self.read()?;
        let rows = self.rows.lock().unwrap();
        let mut found: Vec<&Profile> = rows.values().filter(|p| pred(p)).collect();
        found.sort_by_key(|p| p.created_at);
        Ok(found.into_iter().map(|p| p.id).collect())
    }
}

#[async_trait]
impl ProfileStore for FakeProfileStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        self.read()?;
        *self.lookups.lock().unwrap() += 1;
        Ok(self.get(id))
    }

    async fn create(&self, new_profile: &NewProfile) -> Result<(), AppError> {
        self.write()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .entry(new_profile.id)
            .or_insert_with(|| profile(new_profile.id, None, None));
        row.full_name = row
            .full_name
            .take()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| new_profile.full_name.clone());
        heal(&mut row.phone, new_profile.phone.as_deref(), phone_for_storage);
        heal(&mut row.email, new_profile.email.as_deref(), email_for_storage);
        Ok(())
    }

    async fn fill_missing(&self, id: Uuid, phone: Option<&str>, email: Option<&str>) -> Result<(), AppError> {
        self.write()?;
        if let Some(row) = self.rows.lock().unwrap().get_mut(&id) {
            heal(&mut row.phone, phone, phone_for_storage);
            heal(&mut row.email, email, email_for_storage);
        }
        Ok(())
    }

    async fn update(&self, id: Uuid, changes: &ProfileChanges) -> Result<Profile, AppError> {
        self.write()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&id).ok_or(AppError::NotFound("Profile"))?;
        if changes.full_name.is_some() {
            row.full_name = changes.full_name.clone();
        }
        if changes.phone.is_some() {
            row.phone = changes.phone.clone();
        }
        if changes.email.is_some() {
            row.email = changes.email.clone();
        }
        if changes.avatar_url.is_some() {
            row.avatar_url = changes.avatar_url.clone();
        }
        if changes.pincode.is_some() {
            row.pincode = changes.pincode.clone();
        }
        row.updated_at = Some(Utc::now());
        Ok(row.clone())
    }

    async fn set_push_token(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        self.write()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&id).ok_or(AppError::NotFound("Profile"))?;
        row.expo_push_token = token.map(str::to_string);
        Ok(())
    }

    async fn ids_by_phone(&self, phone: &str) -> Result<Vec<Uuid>, AppError> {
        self.ids_where(|p| p.phone.as_deref() == Some(phone))
    }

    async fn ids_by_phone_suffix(&self, phone: &str) -> Result<Vec<Uuid>, AppError> {
        // phone LIKE '%' || $1
        self.ids_where(|p| p.phone.as_deref().is_some_and(|stored| stored.ends_with(phone)))
    }

    async fn ids_by_email(&self, email: &str) -> Result<Vec<Uuid>, AppError> {
        // LOWER(email) = LOWER($1)
        let wanted = email.to_lowercase();
        self.ids_where(|p| p.email.as_deref().is_some_and(|stored| stored.to_lowercase() == wanted))
    }

    async fn push_tokens(&self, ids: &[Uuid]) -> Result<Vec<(Uuid, String)>, AppError> {
        self.read()?;
        let rows = self.rows.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| rows.get(id))
            .filter_map(|p| p.expo_push_token.clone().map(|t| (p.id, t)))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Clientes
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeCustomerStore {
    rows: Mutex<Vec<Customer>>,
}

impl FakeCustomerStore {
    pub fn add(&self, owner: Uuid, name: &str, phone: Option<&str>, email: Option<&str>) -> Customer {
        let customer = Customer {
            id: Uuid::new_v4(),
            user_id: owner,
            name: name.to_string(),
            phone: phone.map(str::to_string),
            email: email.map(str::to_string),
            initials: None,
            color: None,
            created_at: Some(Utc::now()),
        };
        self.rows.lock().unwrap().push(customer.clone());
        customer
    }

    pub fn by_id(&self, id: Uuid) -> Option<Customer> {
        self.rows.lock().unwrap().iter().find(|c| c.id == id).cloned()
    }
}

#[async_trait]
impl CustomerStore for FakeCustomerStore {
    async fn insert(&self, owner: Uuid, customer: &NewCustomer) -> Result<Customer, AppError> {
        let row = Customer {
            id: Uuid::new_v4(),
            user_id: owner,
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
            initials: Some(customer.initials.clone()),
            color: Some(customer.color.clone()),
            created_at: Some(Utc::now()),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list(&self, owner: Uuid) -> Result<Vec<Customer>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == owner)
            .cloned()
            .collect())
    }

    async fn find_owned(&self, owner: Uuid, id: Uuid) -> Result<Option<Customer>, AppError> {
        Ok(self.by_id(id).filter(|c| c.user_id == owner))
    }

    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| !(c.id == id && c.user_id == owner));
        Ok(rows.len() != before)
    }
}

// ---------------------------------------------------------------------------
// Documentos
// ---------------------------------------------------------------------------

pub struct FakeDocumentStore {
    customers: Arc<FakeCustomerStore>,
    documents: Mutex<Vec<(DocumentKind, Document)>>,
    items: Mutex<Vec<LineItem>>,
    failing_items: Mutex<bool>,
}

impl FakeDocumentStore {
    pub fn new(customers: Arc<FakeCustomerStore>) -> Self {
        Self {
            customers,
            documents: Mutex::new(Vec::new()),
            items: Mutex::new(Vec::new()),
            failing_items: Mutex::new(false),
        }
    }

    pub fn count(&self, kind: DocumentKind) -> usize {
        self.documents.lock().unwrap().iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn fail_items(&self, fail: bool) {
        *self.failing_items.lock().unwrap() = fail;
    }

    fn hydrate(&self, document: Document) -> DocumentDetail {
        let items = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.document_id == document.id)
            .cloned()
            .collect();
        let customer = document.customer_id.and_then(|id| self.customers.by_id(id));
        DocumentDetail::new(document, customer, items)
    }

    fn details_where(&self, kind: DocumentKind, pred: impl Fn(&Document) -> bool) -> Vec<DocumentDetail> {
        let mut matching: Vec<Document> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, d)| *k == kind && pred(d))
            .map(|(_, d)| d.clone())
            .collect();
        matching.sort_by_key(|d| std::cmp::Reverse(d.created_at));
        matching.into_iter().map(|d| self.hydrate(d)).collect()
    }
}

#[async_trait]
impl DocumentStore for FakeDocumentStore {
    async fn insert(&self, kind: DocumentKind, new_document: &NewDocument) -> Result<Document, AppError> {
        let document = Document {
            id: Uuid::new_v4(),
            user_id: new_document.user_id,
            number: new_document.number.clone(),
            customer_id: new_document.customer_id,
            recipient_phone: new_document.recipient_phone.clone(),
            recipient_email: new_document.recipient_email.clone(),
            status: new_document.status.clone(),
            version: new_document.version.clone(),
            amount: Some(new_document.amount),
            date: new_document.date,
            due_date: new_document.due_date,
            notes: new_document.notes.clone(),
            direction: Default::default(),
            created_at: Some(Utc::now()),
        };
        self.documents.lock().unwrap().push((kind, document.clone()));
        Ok(document)
    }

    async fn insert_items(&self, _kind: DocumentKind, document_id: Uuid, items: &[NewLineItem]) -> Result<(), AppError> {
        if *self.failing_items.lock().unwrap() {
            return Err(db_down());
        }
        let mut rows = self.items.lock().unwrap();
        rows.extend(items.iter().map(|i| LineItem {
            id: Uuid::new_v4(),
            document_id,
            name: i.name.clone(),
            qty: i.qty,
            rate: i.rate,
            sort_order: i.sort_order,
        }));
        Ok(())
    }

    async fn find_detail(&self, kind: DocumentKind, id: Uuid) -> Result<Option<DocumentDetail>, AppError> {
        Ok(self.details_where(kind, |d| d.id == id).into_iter().next())
    }

    async fn list_owned(&self, kind: DocumentKind, owner: Uuid) -> Result<Vec<DocumentDetail>, AppError> {
        Ok(self.details_where(kind, |d| d.user_id == owner))
    }

    async fn list_by_recipient_phone(
        &self,
        kind: DocumentKind,
        phone: &str,
        exclude_owner: Uuid,
    ) -> Result<Vec<DocumentDetail>, AppError> {
        Ok(self.details_where(kind, |d| {
            d.user_id != exclude_owner
                && d.recipient_phone
                    .as_deref()
                    .is_some_and(|stored| stored == phone || stored.ends_with(phone))
        }))
    }

    async fn list_by_recipient_email(
        &self,
        kind: DocumentKind,
        email: &str,
        exclude_owner: Uuid,
    ) -> Result<Vec<DocumentDetail>, AppError> {
        let wanted = email.to_lowercase();
        Ok(self.details_where(kind, |d| {
            d.user_id != exclude_owner
                && d.recipient_email
                    .as_deref()
                    .is_some_and(|stored| stored.to_lowercase() == wanted)
        }))
    }

    async fn delete_owned(&self, kind: DocumentKind, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.documents.lock().unwrap();
        let before = rows.len();
        rows.retain(|(k, d)| !(*k == kind && d.id == id && d.user_id == owner));
        let deleted = rows.len() != before;
        if deleted {
            self.items.lock().unwrap().retain(|i| i.document_id != id);
        }
        Ok(deleted)
    }
}

// ---------------------------------------------------------------------------
// Mensagens
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeMessageStore {
    rows: Mutex<Vec<Message>>,
    failing_users: Mutex<HashSet<Uuid>>,
    failing_all: Mutex<bool>,
}

impl FakeMessageStore {
    pub fn for_user(&self, user_id: Uuid) -> Vec<Message> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn all(&self) -> Vec<Message> {
        self.rows.lock().unwrap().clone()
    }

    pub fn fail_for(&self, user_id: Uuid) {
        self.failing_users.lock().unwrap().insert(user_id);
    }

    pub fn fail_all(&self, fail: bool) {
        *self.failing_all.lock().unwrap() = fail;
    }
}

#[async_trait]
impl MessageStore for FakeMessageStore {
    async fn insert(&self, message: &NewMessage) -> Result<Message, AppError> {
        if *self.failing_all.lock().unwrap() || self.failing_users.lock().unwrap().contains(&message.user_id) {
            return Err(db_down());
        }
        let row = Message {
            id: Uuid::new_v4(),
            user_id: message.user_id,
            title: message.title.clone(),
            description: message.description.clone(),
            timestamp: Utc::now(),
            icon: message.icon.clone(),
            icon_color: message.icon_color.clone(),
            unread: true,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Message>, AppError> {
        let mut inbox = self.for_user(user_id);
        inbox.sort_by_key(|m| std::cmp::Reverse(m.timestamp));
        Ok(inbox)
    }

    async fn mark_read(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|m| m.id == id && m.user_id == user_id) {
            Some(message) => {
                message.unread = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Push e e-mail
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakePush {
    sent: Mutex<Vec<PushMessage>>,
}

impl FakePush {
    pub fn sent(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushSender for FakePush {
    async fn send_many(&self, messages: Vec<PushMessage>) {
        self.sent.lock().unwrap().extend(messages);
    }
}

#[derive(Default)]
pub struct FakeMailer {
    recipients: Mutex<Vec<String>>,
    codes: Mutex<Vec<(String, String, Duration)>>,
    resets: Mutex<Vec<(String, String)>>,
    failing: Mutex<bool>,
}

impl FakeMailer {
    pub fn recipients(&self) -> Vec<String> {
        self.recipients.lock().unwrap().clone()
    }

    /// Códigos de verificação enviados, na ordem: (destino, código, validade).
    pub fn codes(&self) -> Vec<(String, String, Duration)> {
        self.codes.lock().unwrap().clone()
    }

    /// Tokens de redefinição enviados, na ordem: (destino, token).
    pub fn resets(&self) -> Vec<(String, String)> {
        self.resets.lock().unwrap().clone()
    }

    pub fn fail(&self, fail: bool) {
        *self.failing.lock().unwrap() = fail;
    }

    fn check(&self, to: &str) -> Result<(), EmailError> {
        if *self.failing.lock().unwrap() {
            return Err(EmailError::InvalidAddress(to.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send_document_received(&self, to: &str, _notice: &DocumentNotice) -> Result<(), EmailError> {
        self.check(to)?;
        self.recipients.lock().unwrap().push(to.to_string());
        Ok(())
    }

    async fn send_verification_code(&self, to: &str, code: &str, expires_in: Duration) -> Result<(), EmailError> {
        self.check(to)?;
        self.codes
            .lock()
            .unwrap()
            .push((to.to_string(), code.to_string(), expires_in));
        Ok(())
    }

    async fn send_password_reset(&self, to: &str, token: &str, _expires_in: Duration) -> Result<(), EmailError> {
        self.check(to)?;
        self.resets.lock().unwrap().push((to.to_string(), token.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Montagem
// ---------------------------------------------------------------------------

pub struct Fakes {
    pub profiles: Arc<FakeProfileStore>,
    pub customers: Arc<FakeCustomerStore>,
    pub documents: Arc<FakeDocumentStore>,
    pub messages: Arc<FakeMessageStore>,
    pub push: Arc<FakePush>,
    pub mailer: Arc<FakeMailer>,
}

impl Default for Fakes {
    fn default() -> Self {
        let customers = Arc::new(FakeCustomerStore::default());
        Self {
            profiles: Arc::default(),
            documents: Arc::new(FakeDocumentStore::new(customers.clone())),
            customers,
            messages: Arc::default(),
            push: Arc::default(),
            mailer: Arc::default(),
        }
    }
}

impl Fakes {
    pub fn resolver(&self) -> ProfileResolver {
        ProfileResolver::new(self.profiles.clone())
    }

    pub fn notifications(&self) -> NotificationService {
        NotificationService::new(
            self.profiles.clone(),
            self.messages.clone(),
            RecipientResolver::new(self.profiles.clone()),
            self.push.clone(),
            self.mailer.clone(),
        )
    }

    pub fn documents_service(&self) -> DocumentService {
        DocumentService::new(
            self.documents.clone(),
            self.customers.clone(),
            self.resolver(),
            self.notifications(),
        )
    }

    pub fn customers_service(&self) -> CustomerService {
        CustomerService::new(self.customers.clone())
    }
}
