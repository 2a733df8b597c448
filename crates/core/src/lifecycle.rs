//! Request lifecycle driver.
//!
//! A host calls the `on_*` extension points while it handles a request and
//! [`RequestLifecycle::finish`] once, late in response construction. Async
//! retrievals go through [`Tracker::retrieve`].

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use serde::Serialize;

use crate::{
    bridge::{DeliveryBridge, Endpoint, InlineOutput, Retrieval, RetrievalResponse, SideChannel},
    buffer::{CaptureBuffers, DeliveryMode, SessionBuffer},
    capture::{CaptureHooks, CaptureOutcome},
    catalog::Catalog,
    config::TrackerConfig,
    emitter::Emitter,
    events::{EventItem, EventKind, ListContext},
    store::{SessionId, SessionStore},
    types::{Cart, CartLine, Order, ProductId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub session: Option<SessionId>,
    pub mode: DeliveryMode,
}

impl RequestContext {
    pub fn full_page(session: Option<SessionId>) -> Self {
        Self {
            session,
            mode: DeliveryMode::FullPage,
        }
    }

    pub fn asynchronous(session: Option<SessionId>) -> Self {
        Self {
            session,
            mode: DeliveryMode::Async,
        }
    }
}

#[derive(Debug, Default)]
pub struct LifecycleMetrics {
    pub captured_total: AtomicU64,
    pub skipped_total: AtomicU64,
    pub emitted_total: AtomicU64,
    pub suppressed_total: AtomicU64,
    pub retrieved_total: AtomicU64,
    pub retrieval_misses_total: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub captured: u64,
    pub skipped: u64,
    pub emitted: u64,
    pub suppressed: u64,
    pub retrieved: u64,
    pub retrieval_misses: u64,
}

impl LifecycleMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_capture(&self, outcome: CaptureOutcome) {
        self.captured_total
            .fetch_add(outcome.captured as u64, Ordering::Relaxed);
        self.skipped_total
            .fetch_add(outcome.skipped as u64, Ordering::Relaxed);
    }

    fn record_emission(&self, emitted: bool) {
        let counter = if emitted {
            &self.emitted_total
        } else {
            &self.suppressed_total
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_retrieval(&self, found: bool) {
        let counter = if found {
            &self.retrieved_total
        } else {
            &self.retrieval_misses_total
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            captured: self.captured_total.load(Ordering::Relaxed),
            skipped: self.skipped_total.load(Ordering::Relaxed),
            emitted: self.emitted_total.load(Ordering::Relaxed),
            suppressed: self.suppressed_total.load(Ordering::Relaxed),
            retrieved: self.retrieved_total.load(Ordering::Relaxed),
            retrieval_misses: self.retrieval_misses_total.load(Ordering::Relaxed),
        }
    }
}

/// Process-wide tracker state, shared by every request.
#[derive(Clone)]
pub struct Tracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    config: TrackerConfig,
    store: Arc<dyn SessionStore>,
    emitter: Emitter,
    side_channel: SideChannel,
    metrics: LifecycleMetrics,
}

impl Tracker {
    pub fn new(config: TrackerConfig, store: Arc<dyn SessionStore>) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                emitter: Emitter::new(&config),
                side_channel: SideChannel::new(Arc::clone(&store)),
                config,
                store,
                metrics: LifecycleMetrics::new(),
            }),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.inner.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    pub fn begin_request<'a>(
        &'a self,
        catalog: &'a dyn Catalog,
        ctx: RequestContext,
    ) -> RequestLifecycle<'a> {
        tracing::debug!(session = ?ctx.session, mode = ?ctx.mode, "request started");
        let inner = &*self.inner;
        RequestLifecycle {
            inner,
            hooks: CaptureHooks::new(catalog, &inner.config, ctx.mode),
            buffers: CaptureBuffers::new(SessionBuffer::new(Arc::clone(&inner.store), ctx.session)),
            bridge: DeliveryBridge::new(ctx.mode, ctx.session, inner.side_channel.clone()),
            ctx,
        }
    }

    /// Side-channel retrieval for `endpoint`. The stored data is cleared as it is read.
    pub async fn retrieve(
        &self,
        session: Option<SessionId>,
        endpoint: Endpoint,
    ) -> RetrievalResponse {
        let inner = &*self.inner;
        let retrieval = inner
            .side_channel
            .retrieve(session, endpoint, &inner.emitter)
            .await;
        let found = matches!(retrieval, Retrieval::Found(_));
        inner.metrics.record_retrieval(found);
        if found && endpoint.emits_on_retrieval() {
            inner.metrics.record_emission(true);
        }
        retrieval.into_response()
    }
}

/// Capture and emission state of one request.
///
/// Dropping it without calling `finish` discards the request tier; anything
/// already in the session tier stays for a later retrieval.
pub struct RequestLifecycle<'a> {
    inner: &'a TrackerInner,
    hooks: CaptureHooks<'a>,
    buffers: CaptureBuffers,
    bridge: DeliveryBridge,
    ctx: RequestContext,
}

impl<'a> RequestLifecycle<'a> {
    pub fn context(&self) -> RequestContext {
        self.ctx
    }

    pub async fn on_listing_rendered(&mut self, context: ListContext, product_ids: &[ProductId]) {
        let outcome = self
            .hooks
            .listing_rendered(&mut self.buffers, context, product_ids)
            .await;
        self.inner.metrics.record_capture(outcome);
    }

    pub async fn on_product_rendered(&mut self, product_id: ProductId) {
        let outcome = self
            .hooks
            .product_rendered(&mut self.buffers, product_id)
            .await;
        self.inner.metrics.record_capture(outcome);
    }

    pub async fn on_item_added(
        &mut self,
        product_id: ProductId,
        variation_id: Option<ProductId>,
        quantity: u32,
    ) {
        let outcome = self
            .hooks
            .item_added(&mut self.buffers, product_id, variation_id, quantity)
            .await;
        self.inner.metrics.record_capture(outcome);
    }

    pub async fn on_item_removed(&mut self, line: &CartLine) {
        let outcome = self.hooks.item_removed(&mut self.buffers, line).await;
        self.inner.metrics.record_capture(outcome);
    }

    pub async fn on_checkout_started(&mut self, cart: &Cart) {
        let outcome = self.hooks.checkout_started(&mut self.buffers, cart).await;
        self.inner.metrics.record_capture(outcome);
    }

    /// Computes the purchase envelope and parks it for the client to fetch.
    pub async fn on_order_finalized(&mut self, order: &Order) {
        let capture = self.hooks.order_finalized(order);
        self.inner.metrics.record_capture(CaptureOutcome {
            captured: capture.items.len(),
            skipped: order.lines.len() - capture.items.len(),
        });

        let envelope = self
            .inner
            .emitter
            .emit_purchase(capture.items, capture.summary);
        self.inner.metrics.record_emission(envelope.is_some());
        if let Some(envelope) = envelope {
            self.bridge.deliver(envelope).await;
        }
    }

    /// Flushes the request tier, in capture order, into the inline output.
    pub async fn finish(mut self) -> InlineOutput {
        for kind in self.buffers.request.pending_kinds() {
            let items = self.buffers.request.drain(kind);
            self.emit(kind, items).await;
        }
        let output = self.bridge.into_inline().into_output(&self.inner.config);
        tracing::debug!(
            session = ?self.ctx.session,
            envelopes = output.envelopes.len(),
            "request finished"
        );
        output
    }

    async fn emit(&mut self, kind: EventKind, items: Vec<EventItem>) {
        let envelope = self.inner.emitter.emit(kind, items);
        self.inner.metrics.record_emission(envelope.is_some());
        if let Some(envelope) = envelope {
            self.bridge.deliver(envelope).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{catalog::MemoryCatalog, store::MemorySessionStore, types::Product};

    fn tracker() -> Tracker {
        Tracker::new(
            TrackerConfig::default(),
            Arc::new(MemorySessionStore::new(Duration::from_secs(60))),
        )
    }

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with_category(1, "Home", None)
            .with_product(Product::simple(1, "Kettle", 45.0), &[1])
            .with_product(Product::simple(2, "Toaster", 60.0), &[1])
    }

    #[tokio::test]
    async fn finish_flushes_in_capture_order() {
        let tracker = tracker();
        let catalog = catalog();
        let mut request = tracker.begin_request(&catalog, RequestContext::full_page(None));

        request.on_product_rendered(ProductId(1)).await;
        request
            .on_listing_rendered(ListContext::Shop, &[ProductId(1), ProductId(2)])
            .await;

        let output = request.finish().await;
        let kinds: Vec<_> = output.envelopes.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![EventKind::ViewItem, EventKind::ViewItemList]);
        assert!(output.script.starts_with("<script>"));
    }

    #[tokio::test]
    async fn request_with_nothing_captured_renders_nothing() {
        let tracker = tracker();
        let catalog = catalog();
        let mut request = tracker.begin_request(&catalog, RequestContext::full_page(None));
        request.on_product_rendered(ProductId(99)).await;

        let output = request.finish().await;
        assert!(output.envelopes.is_empty());
        assert!(output.script.is_empty());
        assert_eq!(tracker.metrics().skipped, 1);
        assert_eq!(tracker.metrics().emitted, 0);
    }

    #[tokio::test]
    async fn metrics_count_captures_and_retrievals() {
        let tracker = tracker();
        let catalog = catalog();
        let session = Some(SessionId::new());

        let mut request = tracker.begin_request(&catalog, RequestContext::asynchronous(session));
        request.on_item_added(ProductId(2), None, 1).await;
        let output = request.finish().await;
        assert!(output.envelopes.is_empty());

        assert!(tracker.retrieve(session, Endpoint::AddToCart).await.is_found());
        assert!(!tracker.retrieve(session, Endpoint::AddToCart).await.is_found());

        let metrics = tracker.metrics();
        assert_eq!(metrics.captured, 1);
        assert_eq!(metrics.emitted, 1);
        assert_eq!(metrics.suppressed, 0);
        assert_eq!(metrics.retrieved, 1);
        assert_eq!(metrics.retrieval_misses, 1);
    }

    #[tokio::test]
    async fn purchase_is_counted_once_across_retrievals() {
        let tracker = tracker();
        let catalog = catalog();
        let session = Some(SessionId::new());
        let order = Order {
            id: 9,
            total: 45.0,
            tax: None,
            shipping: None,
            coupon: None,
            lines: vec![crate::types::OrderLine {
                product_id: ProductId(1),
                variation_id: None,
                quantity: 1,
                price: 45.0,
            }],
        };

        let mut request = tracker.begin_request(&catalog, RequestContext::asynchronous(session));
        request.on_order_finalized(&order).await;
        request.finish().await;
        assert!(tracker.retrieve(session, Endpoint::Purchase).await.is_found());

        let metrics = tracker.metrics();
        assert_eq!(metrics.emitted, 1);
        assert_eq!(metrics.retrieved, 1);
    }
}
