// src/db/profile_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::stores::ProfileStore,
    models::profile::{NewProfile, Profile, ProfileChanges},
};

// Mesmo critério de `phone_for_storage` / `email_for_storage`: vazio ou
// fora da forma canônica pode ser sobrescrito pelo valor vindo do auth.
fn phone_unusable(column: &str) -> String {
    format!(r"length(regexp_replace(COALESCE({column}, ''), '\D', '', 'g')) < 10")
}

fn email_unusable(column: &str) -> String {
    format!(r"COALESCE({column}, '') !~ '^[^\s@]+@[^\s@]+\.[^\s@]+$'")
}

const PROFILE_COLUMNS: &str = r#"
    id, full_name, phone, email, avatar_url, pincode,
    expo_push_token, created_at, updated_at
"#;

// Tabela `profiles` do Supabase (id = auth.users.id)
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ids_where(&self, condition: &str, value: &str) -> Result<Vec<Uuid>, AppError> {
        let sql = format!("SELECT id FROM profiles WHERE {}", condition);
        let ids = sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn create(&self, profile: &NewProfile) -> Result<(), AppError> {
        // Corrida com o trigger on_auth_user_created: ON CONFLICT só completa lacunas
        let sql = format!(
            r#"
            INSERT INTO profiles AS p (id, full_name, phone, email)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                full_name = COALESCE(NULLIF(TRIM(p.full_name), ''), EXCLUDED.full_name),
                phone = CASE WHEN {phone_unusable} THEN COALESCE(EXCLUDED.phone, p.phone) ELSE p.phone END,
                email = CASE WHEN {email_unusable} THEN COALESCE(EXCLUDED.email, p.email) ELSE p.email END,
                updated_at = NOW()
            "#,
            phone_unusable = phone_unusable("p.phone"),
            email_unusable = email_unusable("p.email"),
        );
        sqlx::query(&sql)
            .bind(profile.id)
            .bind(profile.full_name.as_deref())
            .bind(profile.phone.as_deref())
            .bind(profile.email.as_deref())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn fill_missing(
        &self,
        id: Uuid,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), AppError> {
        let sql = format!(
            r#"
            UPDATE profiles SET
                phone = CASE WHEN {phone_unusable} THEN COALESCE($2, phone) ELSE phone END,
                email = CASE WHEN {email_unusable} THEN COALESCE($3, email) ELSE email END,
                updated_at = NOW()
            WHERE id = $1
            "#,
            phone_unusable = phone_unusable("phone"),
            email_unusable = email_unusable("email"),
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(phone)
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update(&self, id: Uuid, changes: &ProfileChanges) -> Result<Profile, AppError> {
        let sql = format!(
            r#"
            UPDATE profiles SET
                full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                avatar_url = COALESCE($5, avatar_url),
                pincode = COALESCE($6, pincode),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(changes.full_name.as_deref())
            .bind(changes.phone.as_deref())
            .bind(changes.email.as_deref())
            .bind(changes.avatar_url.as_deref())
            .bind(changes.pincode.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Profile"))
    }

    async fn set_push_token(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        sqlx::query("UPDATE profiles SET expo_push_token = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ids_by_phone(&self, phone: &str) -> Result<Vec<Uuid>, AppError> {
        self.ids_where("phone = $1", phone).await
    }

    async fn ids_by_phone_suffix(&self, phone: &str) -> Result<Vec<Uuid>, AppError> {
        self.ids_where("phone LIKE '%' || $1", phone).await
    }

    async fn ids_by_email(&self, email: &str) -> Result<Vec<Uuid>, AppError> {
        self.ids_where("LOWER(email) = LOWER($1)", email).await
    }

    async fn push_tokens(&self, ids: &[Uuid]) -> Result<Vec<(Uuid, String)>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT id, expo_push_token FROM profiles
            WHERE id = ANY($1) AND expo_push_token IS NOT NULL AND expo_push_token <> ''
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
