use std::{collections::HashMap, sync::Mutex, time::Duration};

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use crate::{
    error::StoreError,
    store::{SessionId, SessionStore},
};

struct Entry {
    value: Value,
    expires_at: Instant,
}

/// Process-local session store with per-entry expiry.
///
/// Every operation holds the map lock for its whole read-modify-write, so
/// `append` and `take` on one key never interleave.
pub struct MemorySessionStore {
    entries: Mutex<HashMap<(SessionId, String), Entry>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Drops expired entries and returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        Ok(before - entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(session: SessionId, key: &str) -> (SessionId, String) {
        (session, key.to_string())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session: SessionId, key: &str) -> Result<Option<Value>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries
            .get(&Self::slot(session, key))
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.value.clone()))
    }

    async fn set(&self, session: SessionId, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(
            Self::slot(session, key),
            Entry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }

    async fn clear(&self, session: SessionId, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(&Self::slot(session, key));
        Ok(())
    }

    async fn append(
        &self,
        session: SessionId,
        key: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        let entry = entries
            .entry(Self::slot(session, key))
            .or_insert_with(|| Entry {
                value: Value::Array(Vec::new()),
                expires_at: now,
            });

        if entry.expires_at <= now {
            entry.value = Value::Array(Vec::new());
        }
        let Value::Array(list) = &mut entry.value else {
            return Err(StoreError::Corrupt {
                key: key.to_string(),
                reason: "expected an array".to_string(),
            });
        };
        list.push(value);
        entry.expires_at = now + self.ttl;
        Ok(())
    }

    async fn take(&self, session: SessionId, key: &str) -> Result<Option<Value>, StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries
            .remove(&Self::slot(session, key))
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.value))
    }
}
