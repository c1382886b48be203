//! Postgres-backed stores.
//!
//! Queries are built at runtime with `sqlx::query` so the crate compiles
//! without a live database. Every contact query carries `owner_id` in its
//! WHERE clause; a contact belonging to another user is indistinguishable
//! from one that does not exist.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use rolodex_auth::User;
use rolodex_contacts::{Contact, ContactPatch, birthday_within};
use rolodex_core::{ContactId, UserId};

use super::{ContactStore, StoreError, UserStore};

/// Open a connection pool against the given database URL.
pub async fn connect(database_url: &str) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(StoreError::from)
}

/// Create the tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            is_verified BOOLEAN NOT NULL DEFAULT FALSE,
            verification_token TEXT,
            avatar_url TEXT,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id UUID PRIMARY KEY,
            owner_id UUID NOT NULL REFERENCES users(id),
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            birth_date DATE NOT NULL,
            notes TEXT,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS contacts_owner_idx ON contacts (owner_id)")
        .execute(pool)
        .await?;

    Ok(())
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            return StoreError::DuplicateEmail;
        }
        StoreError::Backend(err.to_string())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: UserId::from_uuid(row.try_get("id")?),
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        is_verified: row.try_get("is_verified")?,
        verification_token: row.try_get("verification_token")?,
        avatar_url: row.try_get("avatar_url")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, email, password_hash, is_verified, verification_token,
                 avatar_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_verified)
        .bind(&user.verification_token)
        .bind(&user.avatar_url)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose().map_err(Into::into)
    }

    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE verification_token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose().map_err(Into::into)
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
            SET email = $2, password_hash = $3, is_verified = $4,
                verification_token = $5, avatar_url = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_verified)
        .bind(&user.verification_token)
        .bind(&user.avatar_url)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn contact_from_row(row: &PgRow) -> Result<Contact, sqlx::Error> {
    Ok(Contact {
        id: ContactId::from_uuid(row.try_get("id")?),
        owner_id: UserId::from_uuid(row.try_get("owner_id")?),
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        birth_date: row.try_get::<NaiveDate, _>("birth_date")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn insert(&self, contact: Contact) -> Result<Contact, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO contacts
                (id, owner_id, first_name, last_name, email, phone,
                 birth_date, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(contact.id.as_uuid())
        .bind(contact.owner_id.as_uuid())
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(contact.birth_date)
        .bind(&contact.notes)
        .bind(contact.created_at)
        .bind(contact.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(contact)
    }

    async fn list(
        &self,
        owner_id: UserId,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Contact>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM contacts
            WHERE owner_id = $1
            ORDER BY created_at, id
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(owner_id.as_uuid())
        .bind(skip as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(contact_from_row)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }

    async fn get(&self, owner_id: UserId, id: ContactId) -> Result<Option<Contact>, StoreError> {
        let row = sqlx::query("SELECT * FROM contacts WHERE id = $1 AND owner_id = $2")
            .bind(id.as_uuid())
            .bind(owner_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref()
            .map(contact_from_row)
            .transpose()
            .map_err(Into::into)
    }

    async fn update(
        &self,
        owner_id: UserId,
        id: ContactId,
        patch: ContactPatch,
    ) -> Result<Option<Contact>, StoreError> {
        let Some(mut contact) = self.get(owner_id, id).await? else {
            return Ok(None);
        };
        patch.apply(&mut contact, Utc::now());

        let result = sqlx::query(
            r#"
            UPDATE contacts
            SET first_name = $3, last_name = $4, email = $5, phone = $6,
                birth_date = $7, notes = $8, updated_at = $9
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(contact.id.as_uuid())
        .bind(contact.owner_id.as_uuid())
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(contact.birth_date)
        .bind(&contact.notes)
        .bind(contact.updated_at)
        .execute(&self.pool)
        .await?;

        Ok((result.rows_affected() > 0).then_some(contact))
    }

    async fn delete(&self, owner_id: UserId, id: ContactId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND owner_id = $2")
            .bind(id.as_uuid())
            .bind(owner_id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, owner_id: UserId, query: &str) -> Result<Vec<Contact>, StoreError> {
        let pattern = format!("%{}%", query.replace('%', r"\%").replace('_', r"\_"));
        let rows = sqlx::query(
            r#"
            SELECT * FROM contacts
            WHERE owner_id = $1
              AND (first_name ILIKE $2 OR last_name ILIKE $2 OR email ILIKE $2)
            ORDER BY created_at, id
            "#,
        )
        .bind(owner_id.as_uuid())
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(contact_from_row)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }

    async fn upcoming_birthdays(
        &self,
        owner_id: UserId,
        today: NaiveDate,
        days: u32,
    ) -> Result<Vec<Contact>, StoreError> {
        // Year-wrap and Feb 29 handling live in one shared predicate, so the
        // window is filtered here rather than in SQL.
        let rows = sqlx::query(
            "SELECT * FROM contacts WHERE owner_id = $1 ORDER BY created_at, id",
        )
        .bind(owner_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        let contacts = rows
            .iter()
            .map(contact_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(contacts
            .into_iter()
            .filter(|c| birthday_within(c.birth_date, today, days))
            .collect())
    }
}
