//! Avatar byte storage seam.
//!
//! Stores raw image bytes keyed by user and hands back a public URL for the
//! user record. The in-memory implementation covers dev and tests; a blob
//! store implementation can slot in behind the same trait.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

use rolodex_core::UserId;

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("avatar storage failed: {0}")]
    Backend(String),
}

#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Store the bytes for a user and return the URL to serve them from.
    /// A second upload for the same user replaces the first.
    async fn upload(&self, user_id: UserId, bytes: Vec<u8>) -> Result<String, AvatarError>;

    /// Remove the stored bytes; removing an absent avatar is not an error.
    async fn delete(&self, user_id: UserId) -> Result<(), AvatarError>;
}

#[derive(Debug, Default)]
pub struct InMemoryAvatarStore {
    inner: RwLock<HashMap<UserId, Vec<u8>>>,
}

impl InMemoryAvatarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes_for(&self, user_id: UserId) -> Option<Vec<u8>> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.get(&user_id).cloned()
    }
}

#[async_trait]
impl AvatarStore for InMemoryAvatarStore {
    async fn upload(&self, user_id: UserId, bytes: Vec<u8>) -> Result<String, AvatarError> {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.insert(user_id, bytes);
        Ok(format!("/avatars/{user_id}"))
    }

    async fn delete(&self, user_id: UserId) -> Result<(), AvatarError> {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.remove(&user_id);
        Ok(())
    }
}
