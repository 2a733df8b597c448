use std::sync::Arc;

use crate::{
    buffer::SessionBuffer,
    emitter::Emitter,
    events::{Envelope, EventKind},
    store::{SessionId, SessionStore},
};

pub(crate) fn pending_key(kind: EventKind) -> String {
    format!("cartbeacon:pending:{}", kind.as_str())
}

/// Retrieval routes the client calls after an asynchronous action completes.
///
/// The event kind is fixed by the route; the only input is the session the
/// transport carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    AddToCart,
    RemoveFromCart,
    Purchase,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] =
        [Endpoint::AddToCart, Endpoint::RemoveFromCart, Endpoint::Purchase];

    pub fn kind(&self) -> EventKind {
        match self {
            Endpoint::AddToCart => EventKind::AddToCart,
            Endpoint::RemoveFromCart => EventKind::RemoveFromCart,
            Endpoint::Purchase => EventKind::Purchase,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::AddToCart => "/cartbeacon/add_to_cart",
            Endpoint::RemoveFromCart => "/cartbeacon/remove_from_cart",
            Endpoint::Purchase => "/cartbeacon/purchase",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.path() == path)
    }

    /// Cart endpoints build their envelope when the client asks for it;
    /// purchases are built when the order is finalized.
    pub fn emits_on_retrieval(&self) -> bool {
        !matches!(self, Endpoint::Purchase)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    Found(Envelope),
    NotFound,
}

impl Retrieval {
    pub fn into_response(self) -> RetrievalResponse {
        match self {
            Retrieval::Found(envelope) => match envelope.message_json() {
                Ok(body) => RetrievalResponse { status: 200, body },
                Err(e) => {
                    tracing::warn!(event = %envelope.kind(), error = %e, "failed to encode retrieved envelope");
                    RetrievalResponse::not_found()
                }
            },
            Retrieval::NotFound => RetrievalResponse::not_found(),
        }
    }
}

/// Transport-neutral response for the host framework's route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalResponse {
    pub status: u16,
    pub body: String,
}

impl RetrievalResponse {
    pub fn not_found() -> Self {
        Self {
            status: 204,
            body: String::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.status == 200
    }
}

/// Session-backed store-and-retrieve channel.
#[derive(Clone)]
pub struct SideChannel {
    store: Arc<dyn SessionStore>,
}

impl SideChannel {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Holds `envelope` for later retrieval, replacing any older one of its kind.
    pub async fn store_pending(&self, session: Option<SessionId>, envelope: &Envelope) {
        let kind = envelope.kind();
        let Some(session) = session else {
            tracing::warn!(event = %kind, "no session, side-channel envelope dropped");
            return;
        };
        let value = match serde_json::to_value(envelope) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(event = %kind, error = %e, "failed to encode envelope");
                return;
            }
        };
        match self.store.set(session, &pending_key(kind), value).await {
            Ok(()) => tracing::info!(
                %session,
                event = %kind,
                event_id = %envelope.event_id(),
                "envelope pending retrieval"
            ),
            Err(e) => tracing::warn!(%session, event = %kind, error = %e, "failed to store envelope"),
        }
    }

    /// Serves one retrieval. A second call with nothing new in between is `NotFound`.
    ///
    /// Cart endpoints merge a parked envelope of their kind, if any, with the
    /// session buffer into one fresh envelope.
    pub async fn retrieve(
        &self,
        session: Option<SessionId>,
        endpoint: Endpoint,
        emitter: &Emitter,
    ) -> Retrieval {
        let Some(session) = session else {
            tracing::debug!(endpoint = endpoint.path(), "retrieval without session");
            return Retrieval::NotFound;
        };
        let kind = endpoint.kind();

        let found = match endpoint {
            Endpoint::Purchase => self.take_pending(session, kind).await,
            Endpoint::AddToCart | Endpoint::RemoveFromCart => {
                let mut items = self
                    .take_pending(session, kind)
                    .await
                    .map(|parked| parked.message.ecommerce.items)
                    .unwrap_or_default();
                let buffered = SessionBuffer::new(Arc::clone(&self.store), Some(session))
                    .drain(kind)
                    .await;
                items.extend(buffered);
                emitter.emit(kind, items)
            }
        };

        match found {
            Some(envelope) => {
                tracing::info!(%session, event = %kind, event_id = %envelope.event_id(), "side-channel envelope retrieved");
                Retrieval::Found(envelope)
            }
            None => Retrieval::NotFound,
        }
    }

    async fn take_pending(&self, session: SessionId, kind: EventKind) -> Option<Envelope> {
        match self.store.take(session, &pending_key(kind)).await {
            Ok(Some(value)) => match serde_json::from_value::<Envelope>(value) {
                Ok(envelope) => Some(envelope),
                Err(e) => {
                    tracing::warn!(%session, event = %kind, error = %e, "discarding undecodable pending envelope");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(%session, event = %kind, error = %e, "failed to read pending envelope");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{config::TrackerConfig, events::EventItem, store::MemorySessionStore};

    fn item() -> EventItem {
        EventItem {
            item_id: "3".to_string(),
            item_name: "Mug".to_string(),
            price: 4.0,
            item_brand: String::new(),
            item_category: String::new(),
            item_category2: String::new(),
            item_variant: String::new(),
            quantity: Some(1),
            item_list_id: None,
            item_list_name: None,
            index: None,
            google_business_vertical: "retail".to_string(),
        }
    }

    fn channel() -> SideChannel {
        SideChannel::new(Arc::new(MemorySessionStore::new(Duration::from_secs(60))))
    }

    #[test]
    fn paths_round_trip() {
        for endpoint in Endpoint::ALL {
            assert_eq!(Endpoint::from_path(endpoint.path()), Some(endpoint));
        }
        assert_eq!(Endpoint::from_path("/cartbeacon/view_item"), None);
    }

    #[tokio::test]
    async fn newer_pending_envelope_replaces_older() {
        let channel = channel();
        let emitter = Emitter::new(&TrackerConfig::default());
        let session = Some(SessionId::new());

        let first = Envelope::new(EventKind::Purchase, "UAH", vec![item()], None);
        let second = Envelope::new(EventKind::Purchase, "UAH", vec![item(), item()], None);
        channel.store_pending(session, &first).await;
        channel.store_pending(session, &second).await;

        let Retrieval::Found(got) = channel.retrieve(session, Endpoint::Purchase, &emitter).await
        else {
            panic!("expected pending purchase");
        };
        assert_eq!(got.event_id(), second.event_id());
        assert_eq!(
            channel.retrieve(session, Endpoint::Purchase, &emitter).await,
            Retrieval::NotFound
        );
    }

    #[tokio::test]
    async fn parked_cart_envelope_is_retrieved_with_buffered_items() {
        let store: Arc<dyn SessionStore> =
            Arc::new(MemorySessionStore::new(Duration::from_secs(60)));
        let channel = SideChannel::new(Arc::clone(&store));
        let emitter = Emitter::new(&TrackerConfig::default());
        let session = Some(SessionId::new());

        let parked = Envelope::new(EventKind::AddToCart, "UAH", vec![item()], None);
        channel.store_pending(session, &parked).await;
        SessionBuffer::new(Arc::clone(&store), session)
            .append(EventKind::AddToCart, item())
            .await;

        let Retrieval::Found(got) = channel.retrieve(session, Endpoint::AddToCart, &emitter).await
        else {
            panic!("expected parked add_to_cart");
        };
        assert_eq!(got.items().len(), 2);
        assert_eq!(
            channel.retrieve(session, Endpoint::AddToCart, &emitter).await,
            Retrieval::NotFound
        );
    }

    #[tokio::test]
    async fn no_session_means_not_found() {
        let channel = channel();
        let emitter = Emitter::new(&TrackerConfig::default());
        let envelope = Envelope::new(EventKind::Purchase, "UAH", vec![item()], None);
        channel.store_pending(None, &envelope).await;

        assert_eq!(
            channel.retrieve(None, Endpoint::Purchase, &emitter).await,
            Retrieval::NotFound
        );
    }

    #[test]
    fn responses_map_to_status_codes() {
        let envelope = Envelope::new(EventKind::AddToCart, "UAH", vec![item()], None);
        let found = Retrieval::Found(envelope).into_response();
        assert_eq!(found.status, 200);
        assert!(found.body.starts_with(r#"{"event":"add_to_cart""#));

        let missing = Retrieval::NotFound.into_response();
        assert_eq!(missing.status, 204);
        assert!(missing.body.is_empty());
        assert!(!missing.is_found());
    }
}
