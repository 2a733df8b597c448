//! Short-lived storage between capture and emission.
//!
//! Two tiers with separate types: [`RequestBuffer`] lives and dies with one
//! request, [`SessionBuffer`] survives the asynchronous round trip. Capture hooks
//! name the tier explicitly, derived from the event kind and the request's
//! [`DeliveryMode`] through `Strategy::for_event(..).tier()`.

pub mod request;
pub mod session;

pub use request::*;
pub use session::*;

use serde::{Deserialize, Serialize};

use crate::events::{EventItem, EventKind};

/// How the current request reaches the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// A full page is rendered; pending events can be embedded inline.
    FullPage,
    /// A partial-page update; the client fetches events afterwards.
    Async,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTier {
    Request,
    Session,
}

/// Both tiers for one request.
pub struct CaptureBuffers {
    pub request: RequestBuffer,
    pub session: SessionBuffer,
}

impl CaptureBuffers {
    pub fn new(session: SessionBuffer) -> Self {
        Self {
            request: RequestBuffer::new(),
            session,
        }
    }

    pub async fn append(&mut self, tier: BufferTier, kind: EventKind, item: EventItem) {
        match tier {
            BufferTier::Request => self.request.append(kind, item),
            BufferTier::Session => self.session.append(kind, item).await,
        }
    }

    pub async fn drain(&mut self, tier: BufferTier, kind: EventKind) -> Vec<EventItem> {
        match tier {
            BufferTier::Request => self.request.drain(kind),
            BufferTier::Session => self.session.drain(kind).await,
        }
    }

    pub async fn is_empty(&self, tier: BufferTier, kind: EventKind) -> bool {
        match tier {
            BufferTier::Request => self.request.is_empty(kind),
            BufferTier::Session => self.session.is_empty(kind).await,
        }
    }
}
