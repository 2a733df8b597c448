//! Session-scoped key/value storage.
//!
//! The store outlives a single request: data written while handling one
//! asynchronous action is read back by the next request of the same session.

pub mod memory;

pub use memory::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::StoreError;

/// Durable identifier of one browsing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session: SessionId, key: &str) -> Result<Option<Value>, StoreError>;

    /// Overwrites whatever is stored under `key`.
    async fn set(&self, session: SessionId, key: &str, value: Value) -> Result<(), StoreError>;

    async fn clear(&self, session: SessionId, key: &str) -> Result<(), StoreError>;

    /// Pushes `value` onto the array stored under `key`, creating it if needed.
    ///
    /// Must be atomic with respect to [`SessionStore::take`] on the same key.
    async fn append(&self, session: SessionId, key: &str, value: Value)
    -> Result<(), StoreError>;

    /// Returns the stored value and removes it in a single step.
    async fn take(&self, session: SessionId, key: &str) -> Result<Option<Value>, StoreError>;
}
