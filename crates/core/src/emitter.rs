use crate::{
    config::TrackerConfig,
    events::{Envelope, EventItem, EventKind, PurchaseSummary},
};

/// Builds envelopes from drained items.
#[derive(Debug, Clone)]
pub struct Emitter {
    currency: String,
}

impl Emitter {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            currency: config.currency.clone(),
        }
    }

    /// `None` when `items` is empty: an event without lines is never sent.
    pub fn emit(&self, kind: EventKind, items: Vec<EventItem>) -> Option<Envelope> {
        if items.is_empty() {
            tracing::debug!(event = %kind, "nothing captured, suppressing emission");
            return None;
        }
        let envelope = Envelope::new(kind, &self.currency, items, None);
        tracing::info!(
            event = %kind,
            event_id = %envelope.event_id(),
            items = envelope.items().len(),
            "emitted envelope"
        );
        Some(envelope)
    }

    pub fn emit_purchase(
        &self,
        items: Vec<EventItem>,
        summary: PurchaseSummary,
    ) -> Option<Envelope> {
        if items.is_empty() {
            tracing::debug!(transaction_id = %summary.transaction_id, "order has no reportable lines, suppressing purchase");
            return None;
        }
        let transaction_id = summary.transaction_id.clone();
        let envelope = Envelope::new(EventKind::Purchase, &self.currency, items, Some(summary));
        tracing::info!(
            event = %EventKind::Purchase,
            event_id = %envelope.event_id(),
            %transaction_id,
            items = envelope.items().len(),
            "emitted envelope"
        );
        Some(envelope)
    }
}
