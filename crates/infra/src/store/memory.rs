//! In-memory stores for dev and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use rolodex_auth::User;
use rolodex_contacts::{Contact, ContactPatch, birthday_within, contact::matches_query};
use rolodex_core::{ContactId, UserId};

use super::{ContactStore, StoreError, UserStore};

/// RwLock-guarded user map. Emails are expected pre-normalized (trimmed,
/// lowercase) by the domain layer.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        if map.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        map.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map
            .values()
            .find(|u| u.verification_token.as_deref() == Some(token))
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        map.insert(user.id, user.clone());
        Ok(())
    }
}

/// RwLock-guarded contact map; every read and mutation filters on the owner.
#[derive(Debug, Default)]
pub struct InMemoryContactStore {
    inner: RwLock<HashMap<ContactId, Contact>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn insert(&self, contact: Contact) -> Result<Contact, StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        map.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn list(
        &self,
        owner_id: UserId,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Contact>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        let mut contacts: Vec<Contact> = map
            .values()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        contacts.sort_by_key(|c| (c.created_at, c.id.to_string()));
        Ok(contacts
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn get(&self, owner_id: UserId, id: ContactId) -> Result<Option<Contact>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map
            .get(&id)
            .filter(|c| c.owner_id == owner_id)
            .cloned())
    }

    async fn update(
        &self,
        owner_id: UserId,
        id: ContactId,
        patch: ContactPatch,
    ) -> Result<Option<Contact>, StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        let Some(contact) = map.get_mut(&id).filter(|c| c.owner_id == owner_id) else {
            return Ok(None);
        };
        patch.apply(contact, Utc::now());
        Ok(Some(contact.clone()))
    }

    async fn delete(&self, owner_id: UserId, id: ContactId) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        let owned = map
            .get(&id)
            .map(|c| c.owner_id == owner_id)
            .unwrap_or(false);
        if owned {
            map.remove(&id);
        }
        Ok(owned)
    }

    async fn search(&self, owner_id: UserId, query: &str) -> Result<Vec<Contact>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        let mut contacts: Vec<Contact> = map
            .values()
            .filter(|c| c.owner_id == owner_id && matches_query(c, query))
            .cloned()
            .collect();
        contacts.sort_by_key(|c| (c.created_at, c.id.to_string()));
        Ok(contacts)
    }

    async fn upcoming_birthdays(
        &self,
        owner_id: UserId,
        today: NaiveDate,
        days: u32,
    ) -> Result<Vec<Contact>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        let mut contacts: Vec<Contact> = map
            .values()
            .filter(|c| c.owner_id == owner_id && birthday_within(c.birth_date, today, days))
            .cloned()
            .collect();
        contacts.sort_by_key(|c| (c.created_at, c.id.to_string()));
        Ok(contacts)
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Backend("store lock poisoned".to_owned())
}
