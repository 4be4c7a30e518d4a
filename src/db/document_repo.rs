// src/db/document_repo.rs
//
// Uma implementação para faturas e orçamentos; os nomes de tabela e coluna
// vêm de `DocumentKind` (constantes, nunca entrada do usuário).

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::stores::DocumentStore,
    models::{
        customer::Customer,
        document::{Document, DocumentDetail, DocumentKind, LineItem, NewDocument, NewLineItem},
    },
};

fn select_columns(kind: DocumentKind) -> String {
    let version = match kind {
        DocumentKind::Invoice => "NULL::text AS version",
        DocumentKind::Quotation => "version",
    };
    format!(
        "id, user_id, {} AS number, customer_id, recipient_phone, recipient_email, \
         status, {}, amount, date, {} AS due_date, notes, created_at",
        kind.number_column(),
        version,
        kind.due_column(),
    )
}

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Carrega itens e clientes de uma leva de documentos (o "select aninhado").
    async fn hydrate(&self, kind: DocumentKind, documents: Vec<Document>) -> Result<Vec<DocumentDetail>, AppError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = documents.iter().map(|d| d.id).collect();
        let items_sql = format!(
            "SELECT id, {parent} AS document_id, name, qty, rate, sort_order \
             FROM {table} WHERE {parent} = ANY($1) ORDER BY sort_order ASC",
            parent = kind.parent_column(),
            table = kind.items_table(),
        );
        let items = sqlx::query_as::<_, LineItem>(&items_sql)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        let customer_ids: Vec<Uuid> = documents.iter().filter_map(|d| d.customer_id).collect();
        let customers = if customer_ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query_as::<_, Customer>(
                r#"
                SELECT id, user_id, name, phone, email, initials, color, created_at
                FROM customers WHERE id = ANY($1)
                "#,
            )
            .bind(&customer_ids)
            .fetch_all(&self.pool)
            .await?
        };

        let mut items_by_doc: HashMap<Uuid, Vec<LineItem>> = HashMap::new();
        for item in items {
            items_by_doc.entry(item.document_id).or_default().push(item);
        }
        let customers_by_id: HashMap<Uuid, Customer> =
            customers.into_iter().map(|c| (c.id, c)).collect();

        Ok(documents
            .into_iter()
            .map(|doc| {
                let customer = doc.customer_id.and_then(|id| customers_by_id.get(&id).cloned());
                let items = items_by_doc.remove(&doc.id).unwrap_or_default();
                DocumentDetail::new(doc, customer, items)
            })
            .collect())
    }
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn insert(&self, kind: DocumentKind, document: &NewDocument) -> Result<Document, AppError> {
        // A coluna `version` só existe em orçamentos
        let (version_column, version_param) = match kind {
            DocumentKind::Invoice => ("", ""),
            DocumentKind::Quotation => (", version", ", $11"),
        };
        let sql = format!(
            r#"
            INSERT INTO {table} (
                user_id, {number}, customer_id, recipient_phone, recipient_email,
                status, amount, date, {due}, notes, type{version_column}
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'sent'{version_param})
            RETURNING {columns}
            "#,
            table = kind.table(),
            number = kind.number_column(),
            due = kind.due_column(),
            columns = select_columns(kind),
        );

        let mut query = sqlx::query_as::<_, Document>(&sql)
            .bind(document.user_id)
            .bind(&document.number)
            .bind(document.customer_id)
            .bind(document.recipient_phone.as_deref())
            .bind(document.recipient_email.as_deref())
            .bind(&document.status)
            .bind(document.amount)
            .bind(document.date)
            .bind(document.due_date)
            .bind(document.notes.as_deref());
        if kind == DocumentKind::Quotation {
            query = query.bind(document.version.as_deref());
        }

        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn insert_items(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
        items: &[NewLineItem],
    ) -> Result<(), AppError> {
        if items.is_empty() {
            return Ok(());
        }

        let names: Vec<String> = items.iter().map(|i| i.name.clone()).collect();
        let qtys: Vec<Decimal> = items.iter().map(|i| i.qty).collect();
        let rates: Vec<Decimal> = items.iter().map(|i| i.rate).collect();
        let orders: Vec<i32> = items.iter().map(|i| i.sort_order).collect();

        let sql = format!(
            r#"
            INSERT INTO {table} ({parent}, name, qty, rate, sort_order)
            SELECT $1, t.name, t.qty, t.rate, t.sort_order
            FROM UNNEST($2::text[], $3::numeric[], $4::numeric[], $5::int4[])
                AS t(name, qty, rate, sort_order)
            "#,
            table = kind.items_table(),
            parent = kind.parent_column(),
        );
        sqlx::query(&sql)
            .bind(document_id)
            .bind(&names)
            .bind(&qtys)
            .bind(&rates)
            .bind(&orders)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_detail(&self, kind: DocumentKind, id: Uuid) -> Result<Option<DocumentDetail>, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", select_columns(kind), kind.table());
        let document = sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match document {
            Some(doc) => Ok(self.hydrate(kind, vec![doc]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_owned(&self, kind: DocumentKind, owner: Uuid) -> Result<Vec<DocumentDetail>, AppError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE user_id = $1 ORDER BY created_at DESC",
            select_columns(kind),
            kind.table()
        );
        let documents = sqlx::query_as::<_, Document>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(kind, documents).await
    }

    async fn list_by_recipient_phone(
        &self,
        kind: DocumentKind,
        phone: &str,
        exclude_owner: Uuid,
    ) -> Result<Vec<DocumentDetail>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM {}
            WHERE user_id <> $2
              AND (recipient_phone = $1 OR recipient_phone LIKE '%' || $1)
            "#,
            select_columns(kind),
            kind.table()
        );
        let documents = sqlx::query_as::<_, Document>(&sql)
            .bind(phone)
            .bind(exclude_owner)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(kind, documents).await
    }

    async fn list_by_recipient_email(
        &self,
        kind: DocumentKind,
        email: &str,
        exclude_owner: Uuid,
    ) -> Result<Vec<DocumentDetail>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM {}
            WHERE user_id <> $2 AND LOWER(recipient_email) = LOWER($1)
            "#,
            select_columns(kind),
            kind.table()
        );
        let documents = sqlx::query_as::<_, Document>(&sql)
            .bind(email)
            .bind(exclude_owner)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(kind, documents).await
    }

    async fn delete_owned(&self, kind: DocumentKind, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        // Itens saem junto (ON DELETE CASCADE)
        let sql = format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", kind.table());
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
