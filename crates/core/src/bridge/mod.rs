//! Moves emitted envelopes to the client.
//!
//! | kind                          | full page     | async         |
//! |-------------------------------|---------------|---------------|
//! | view_item_list, view_item     | inline        | inline        |
//! | add_to_cart, remove_from_cart | inline        | side channel  |
//! | begin_checkout                | inline, guarded | inline, guarded |
//! | purchase                      | side channel  | side channel  |

pub mod inline;
pub mod side_channel;

pub use inline::*;
pub use side_channel::*;

use crate::{
    buffer::{BufferTier, DeliveryMode},
    events::{Envelope, EventKind},
    store::SessionId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Embedded in the response being rendered.
    Inline,
    /// Held in the session store until the client asks for it.
    SideChannel,
}

impl Strategy {
    pub fn for_event(kind: EventKind, mode: DeliveryMode) -> Self {
        match (kind, mode) {
            (EventKind::ViewItemList | EventKind::ViewItem | EventKind::BeginCheckout, _) => {
                Strategy::Inline
            }
            (EventKind::AddToCart | EventKind::RemoveFromCart, DeliveryMode::FullPage) => {
                Strategy::Inline
            }
            (EventKind::AddToCart | EventKind::RemoveFromCart, DeliveryMode::Async) => {
                Strategy::SideChannel
            }
            (EventKind::Purchase, _) => Strategy::SideChannel,
        }
    }

    /// Buffer tier that items of this strategy wait in.
    pub fn tier(&self) -> BufferTier {
        match self {
            Strategy::Inline => BufferTier::Request,
            Strategy::SideChannel => BufferTier::Session,
        }
    }
}

/// Per-request delivery: collects inline envelopes and forwards side-channel
/// ones to the session store.
pub struct DeliveryBridge {
    mode: DeliveryMode,
    session: Option<SessionId>,
    inline: InlineSink,
    side_channel: SideChannel,
}

impl DeliveryBridge {
    pub fn new(mode: DeliveryMode, session: Option<SessionId>, side_channel: SideChannel) -> Self {
        Self {
            mode,
            session,
            inline: InlineSink::new(),
            side_channel,
        }
    }

    pub async fn deliver(&mut self, envelope: Envelope) {
        match Strategy::for_event(envelope.kind(), self.mode) {
            Strategy::Inline => self.inline.push(envelope),
            Strategy::SideChannel => {
                self.side_channel
                    .store_pending(self.session, &envelope)
                    .await
            }
        }
    }

    pub fn inline(&self) -> &InlineSink {
        &self.inline
    }

    pub fn into_inline(self) -> InlineSink {
        self.inline
    }
}
