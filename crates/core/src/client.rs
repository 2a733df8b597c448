//! Model of the client-side runtime that feeds the analytics queue.

use serde_json::{Value, json};

use crate::{
    bridge::RetrievalResponse,
    config::TrackerConfig,
    dedup::{DedupGuard, NavigationTokens, token_key},
    events::{Envelope, EventMessage},
};

/// The ordered client queue the analytics tag consumes.
#[derive(Debug, Default, Clone)]
pub struct DataLayer {
    messages: Vec<Value>,
}

impl DataLayer {
    pub fn reset_marker() -> Value {
        json!({ "ecommerce": null })
    }

    /// Pushes the reset marker and `message` back to back, or nothing at all.
    pub fn push_pair(&mut self, message: &EventMessage) -> Result<(), serde_json::Error> {
        let event = serde_json::to_value(message)?;
        self.messages.push(Self::reset_marker());
        self.messages.push(event);
        Ok(())
    }

    pub fn messages(&self) -> &[Value] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Event messages of `kind`, skipping reset markers.
    pub fn events_named(&self, kind: &str) -> Vec<&Value> {
        self.messages
            .iter()
            .filter(|m| m.get("event").and_then(Value::as_str) == Some(kind))
            .collect()
    }
}

pub struct ClientRuntime<G: DedupGuard = NavigationTokens> {
    data_layer: DataLayer,
    guard: G,
    token_prefix: String,
}

impl ClientRuntime<NavigationTokens> {
    pub fn new(config: &TrackerConfig) -> Self {
        Self::with_guard(config, NavigationTokens::new())
    }

    /// A page load: dedup tokens from the previous page no longer apply.
    pub fn new_navigation(&mut self) {
        self.guard.begin_navigation();
    }
}

impl<G: DedupGuard> ClientRuntime<G> {
    pub fn with_guard(config: &TrackerConfig, guard: G) -> Self {
        Self {
            data_layer: DataLayer::default(),
            guard,
            token_prefix: config.dedup_key_prefix.clone(),
        }
    }

    pub fn data_layer(&self) -> &DataLayer {
        &self.data_layer
    }

    /// Pushes `envelope`, consulting the dedup guard for one-shot kinds.
    /// Returns whether anything reached the queue.
    pub fn push(&mut self, envelope: &Envelope) -> bool {
        self.push_message(&envelope.message)
    }

    /// Applies the body of a side-channel retrieval. "Not found" and malformed
    /// bodies leave the queue untouched.
    pub fn apply_side_channel(&mut self, response: &RetrievalResponse) -> bool {
        if !response.is_found() {
            return false;
        }
        match serde_json::from_str::<EventMessage>(&response.body) {
            Ok(message) => self.push_message(&message),
            Err(e) => {
                tracing::warn!(error = %e, "malformed side-channel payload ignored");
                false
            }
        }
    }

    fn push_message(&mut self, message: &EventMessage) -> bool {
        if message.ecommerce.items.is_empty() {
            return false;
        }
        if !message.event.is_one_shot() {
            return self.try_push(message);
        }

        let key = token_key(&self.token_prefix, message.event);
        if !self.guard.should_emit(&key) {
            tracing::debug!(token = %key, "one-shot event already pushed in this navigation");
            return false;
        }
        let pushed = self.try_push(message);
        if pushed {
            self.guard.mark_emitted(&key);
        }
        pushed
    }

    fn try_push(&mut self, message: &EventMessage) -> bool {
        match self.data_layer.push_pair(message) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(event = %message.event, error = %e, "failed to push event");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventItem, EventKind};

    fn envelope(kind: EventKind) -> Envelope {
        let item = EventItem {
            item_id: "1".to_string(),
            item_name: "Bag".to_string(),
            price: 30.0,
            item_brand: String::new(),
            item_category: String::new(),
            item_category2: String::new(),
            item_variant: String::new(),
            quantity: Some(1),
            item_list_id: None,
            item_list_name: None,
            index: None,
            google_business_vertical: "retail".to_string(),
        };
        Envelope::new(kind, "UAH", vec![item], None)
    }

    #[test]
    fn push_adds_reset_then_event() {
        let mut client = ClientRuntime::new(&TrackerConfig::default());
        assert!(client.push(&envelope(EventKind::ViewItem)));

        let messages = client.data_layer().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], DataLayer::reset_marker());
        assert_eq!(messages[1]["event"], "view_item");
    }

    #[test]
    fn checkout_pushes_once_per_navigation() {
        let mut client = ClientRuntime::new(&TrackerConfig::default());
        assert!(client.push(&envelope(EventKind::BeginCheckout)));
        assert!(!client.push(&envelope(EventKind::BeginCheckout)));
        assert_eq!(client.data_layer().events_named("begin_checkout").len(), 1);

        client.new_navigation();
        assert!(client.push(&envelope(EventKind::BeginCheckout)));
        assert_eq!(client.data_layer().events_named("begin_checkout").len(), 2);
    }

    #[test]
    fn repeatable_kinds_are_not_guarded() {
        let mut client = ClientRuntime::new(&TrackerConfig::default());
        assert!(client.push(&envelope(EventKind::AddToCart)));
        assert!(client.push(&envelope(EventKind::AddToCart)));
        assert_eq!(client.data_layer().len(), 4);
    }

    #[test]
    fn malformed_payload_leaves_queue_unchanged() {
        let mut client = ClientRuntime::new(&TrackerConfig::default());
        let response = RetrievalResponse {
            status: 200,
            body: r#"{"event":"purchase","ecommerce":"#.to_string(),
        };
        assert!(!client.apply_side_channel(&response));
        assert!(client.data_layer().is_empty());
    }

    #[test]
    fn not_found_is_silent() {
        let mut client = ClientRuntime::new(&TrackerConfig::default());
        assert!(!client.apply_side_channel(&RetrievalResponse::not_found()));
        assert!(client.data_layer().is_empty());
    }
}
