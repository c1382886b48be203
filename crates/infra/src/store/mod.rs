//! Store contracts and implementations.
//!
//! Every contact operation takes the owner's [`UserId`] and filters on it,
//! which makes cross-user access architecturally impossible regardless of
//! backend.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use rolodex_auth::User;
use rolodex_contacts::{Contact, ContactPatch};
use rolodex_core::{ContactId, UserId};

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::{InMemoryContactStore, InMemoryUserStore};

/// Storage failure surfaced to the HTTP layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique-email constraint violated on insert.
    #[error("email already registered")]
    DuplicateEmail,

    /// Backend failure (connection, query, decode).
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Identity store boundary, consumed by the auth gate and the
/// registration/verification flows.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: User) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, StoreError>;

    /// Persist mutations to an existing user (verified flag, token clear,
    /// avatar URL).
    async fn update(&self, user: &User) -> Result<(), StoreError>;
}

/// Contact persistence boundary. All operations are owner-scoped.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert(&self, contact: Contact) -> Result<Contact, StoreError>;

    async fn list(
        &self,
        owner_id: UserId,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Contact>, StoreError>;

    async fn get(&self, owner_id: UserId, id: ContactId) -> Result<Option<Contact>, StoreError>;

    /// Apply a patch to an owned contact; `None` when absent or not owned.
    async fn update(
        &self,
        owner_id: UserId,
        id: ContactId,
        patch: ContactPatch,
    ) -> Result<Option<Contact>, StoreError>;

    /// Delete an owned contact; `false` when absent or not owned.
    async fn delete(&self, owner_id: UserId, id: ContactId) -> Result<bool, StoreError>;

    /// Case-insensitive substring search over first name, last name, email.
    async fn search(&self, owner_id: UserId, query: &str) -> Result<Vec<Contact>, StoreError>;

    /// Contacts whose next birthday falls within `days` of `today`.
    async fn upcoming_birthdays(
        &self,
        owner_id: UserId,
        today: NaiveDate,
        days: u32,
    ) -> Result<Vec<Contact>, StoreError>;
}
