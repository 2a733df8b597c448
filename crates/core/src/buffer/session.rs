use std::sync::Arc;

use serde_json::Value;

use crate::{
    events::{EventItem, EventKind},
    store::{SessionId, SessionStore},
};

pub(crate) fn buffer_key(kind: EventKind) -> String {
    format!("cartbeacon:buffer:{}", kind.as_str())
}

/// Session-scoped pending items.
///
/// Without a session, or when the store fails, appends are dropped and drains
/// come back empty. Both are logged, neither is an error for the caller.
#[derive(Clone)]
pub struct SessionBuffer {
    store: Arc<dyn SessionStore>,
    session: Option<SessionId>,
}

impl SessionBuffer {
    pub fn new(store: Arc<dyn SessionStore>, session: Option<SessionId>) -> Self {
        Self { store, session }
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    pub async fn append(&self, kind: EventKind, item: EventItem) {
        let Some(session) = self.session else {
            tracing::warn!(event = %kind, item_id = %item.item_id, "no session, dropping captured item");
            return;
        };
        let value = match serde_json::to_value(&item) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(event = %kind, error = %e, "failed to encode captured item");
                return;
            }
        };
        if let Err(e) = self.store.append(session, &buffer_key(kind), value).await {
            tracing::warn!(%session, event = %kind, error = %e, "session store append failed");
        }
    }

    /// Reads and clears the pending items for `kind` in one store operation.
    pub async fn drain(&self, kind: EventKind) -> Vec<EventItem> {
        let Some(session) = self.session else {
            return Vec::new();
        };
        match self.store.take(session, &buffer_key(kind)).await {
            Ok(Some(value)) => decode_items(kind, value),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(%session, event = %kind, error = %e, "session store drain failed");
                Vec::new()
            }
        }
    }

    pub async fn is_empty(&self, kind: EventKind) -> bool {
        let Some(session) = self.session else {
            return true;
        };
        match self.store.get(session, &buffer_key(kind)).await {
            Ok(Some(Value::Array(list))) => list.is_empty(),
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(%session, event = %kind, error = %e, "session store read failed");
                true
            }
        }
    }
}

fn decode_items(kind: EventKind, value: Value) -> Vec<EventItem> {
    match serde_json::from_value::<Vec<EventItem>>(value) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(event = %kind, error = %e, "discarding undecodable session buffer");
            Vec::new()
        }
    }
}
