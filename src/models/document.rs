// src/models/document.rs
//
// Faturas (invoices) e orçamentos (quotations) compartilham o mesmo
// formato; o que muda é a tabela e alguns padrões.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::customer::Customer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Invoice,
    Quotation,
}

impl DocumentKind {
    pub fn table(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoices",
            DocumentKind::Quotation => "quotations",
        }
    }

    pub fn items_table(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice_items",
            DocumentKind::Quotation => "quotation_items",
        }
    }

    /// Coluna da tabela de itens que aponta para o documento.
    pub fn parent_column(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice_id",
            DocumentKind::Quotation => "quotation_id",
        }
    }

    pub fn number_column(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "number",
            DocumentKind::Quotation => "quo_number",
        }
    }

    pub fn due_column(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "due_date",
            DocumentKind::Quotation => "valid_till",
        }
    }

    pub fn default_status(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "pending",
            DocumentKind::Quotation => "draft",
        }
    }

    pub fn default_version(self) -> Option<&'static str> {
        match self {
            DocumentKind::Invoice => None,
            DocumentKind::Quotation => Some("v1"),
        }
    }

    /// Nome exibido em mensagens, push e e-mail.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "Invoice",
            DocumentKind::Quotation => "Quotation",
        }
    }

    /// Valor de `type` no envelope de dados do push.
    pub fn tag(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Quotation => "quotation",
        }
    }
}

/// `sent` é o que se persiste; `received` só existe nas respostas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Sent,
    Received,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "INV-0042")]
    pub number: String,
    pub customer_id: Option<Uuid>,
    #[schema(example = "9876543210")]
    pub recipient_phone: Option<String>,
    pub recipient_email: Option<String>,
    #[schema(example = "pending")]
    pub status: String,
    // Só orçamentos têm versão
    pub version: Option<String>,
    #[schema(example = "250.00")]
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[sqlx(skip)]
    #[serde(rename = "type")]
    pub direction: Direction,
    pub created_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Chave de ordenação: created_at, senão a data do documento.
    pub fn sort_key(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .or_else(|| self.date.map(|d| d.and_time(NaiveTime::MIN).and_utc()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LineItem {
    pub id: Uuid,
    pub document_id: Uuid,
    #[schema(example = "Consulting hour")]
    pub name: String,
    #[schema(example = "2")]
    pub qty: Decimal,
    #[schema(example = "100.00")]
    pub rate: Decimal,
    pub sort_order: i32,
}

/// Documento completo: cabeçalho + cliente + itens.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: Document,
    pub customer: Option<Customer>,
    pub items: Vec<LineItem>,
    #[schema(example = "250.00")]
    pub total: Decimal,
}

impl DocumentDetail {
    pub fn new(document: Document, customer: Option<Customer>, mut items: Vec<LineItem>) -> Self {
        items.sort_by_key(|i| i.sort_order);
        let total = items_total(&items);
        Self {
            document,
            customer,
            items,
            total,
        }
    }

    pub fn id(&self) -> Uuid {
        self.document.id
    }
}

pub fn items_total(items: &[LineItem]) -> Decimal {
    items.iter().map(|i| i.qty * i.rate).sum()
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: Uuid,
    pub number: String,
    pub customer_id: Option<Uuid>,
    pub recipient_phone: Option<String>,
    pub recipient_email: Option<String>,
    pub status: String,
    pub version: Option<String>,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItem {
    pub name: String,
    pub qty: Decimal,
    pub rate: Decimal,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LineItemPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Consulting hour")]
    pub name: String,
    #[schema(example = "2")]
    pub qty: Option<Decimal>,
    #[schema(example = "100.00")]
    pub rate: Option<Decimal>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateDocumentPayload {
    // Orçamentos usam quo_number no app
    #[serde(default, alias = "quo_number")]
    #[schema(example = "INV-0042")]
    pub number: String,

    pub customer_id: Option<Uuid>,

    // Sobrescrevem o telefone/e-mail do cliente
    #[schema(example = "+91 98765 43210")]
    pub recipient_phone: Option<String>,
    pub recipient_email: Option<String>,

    pub status: Option<String>,
    pub version: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    #[serde(alias = "valid_till")]
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<LineItemPayload>,
}
