use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::{EventItem, EventKind};

/// Bookkeeping that travels with an envelope but never reaches the client queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    pub event_id: Uuid,
    pub created_at_ms: u64,
}

impl EnvelopeHeader {
    pub fn new() -> Self {
        let created_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            event_id: Uuid::new_v4(),
            created_at_ms,
        }
    }
}

impl Default for EnvelopeHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Order-level totals carried by `purchase` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseSummary {
    pub transaction_id: String,
    pub value: f64,
    pub tax: Option<f64>,
    pub shipping: Option<f64>,
    pub coupon: Option<String>,
}

/// The `ecommerce` object of a queue message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ecommerce {
    pub currency: String,
    pub items: Vec<EventItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
}

/// The event message pushed onto the client queue right after the reset marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    pub event: EventKind,
    pub ecommerce: Ecommerce,
}

/// One emission unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub header: EnvelopeHeader,
    pub message: EventMessage,
}

impl Envelope {
    pub fn new(
        kind: EventKind,
        currency: &str,
        items: Vec<EventItem>,
        purchase: Option<PurchaseSummary>,
    ) -> Self {
        let (transaction_id, value, tax, shipping, coupon) = match purchase {
            Some(p) => (Some(p.transaction_id), Some(p.value), p.tax, p.shipping, p.coupon),
            None => (None, None, None, None, None),
        };
        Self {
            header: EnvelopeHeader::new(),
            message: EventMessage {
                event: kind,
                ecommerce: Ecommerce {
                    currency: currency.to_string(),
                    items,
                    transaction_id,
                    value,
                    tax,
                    shipping,
                    coupon,
                },
            },
        }
    }

    pub fn kind(&self) -> EventKind {
        self.message.event
    }

    pub fn items(&self) -> &[EventItem] {
        &self.message.ecommerce.items
    }

    pub fn event_id(&self) -> Uuid {
        self.header.event_id
    }

    pub fn message_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.message)
    }
}
