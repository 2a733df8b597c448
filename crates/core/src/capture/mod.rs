//! Capture hooks: commerce lifecycle points in, buffered [`EventItem`]s out.
//!
//! Hooks never fail. Entities that cannot be resolved are skipped and counted.

pub mod normalize;

pub use normalize::*;

use crate::{
    bridge::Strategy,
    buffer::{BufferTier, CaptureBuffers, DeliveryMode},
    catalog::Catalog,
    config::TrackerConfig,
    events::{EventItem, EventKind, ListContext, PurchaseSummary},
    types::{Cart, CartLine, Order, ProductId},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub captured: usize,
    pub skipped: usize,
}

/// Items and totals of a finalized order, ready for the emitter.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseCapture {
    pub items: Vec<EventItem>,
    pub summary: PurchaseSummary,
}

pub struct CaptureHooks<'a> {
    normalizer: ItemNormalizer<'a>,
    mode: DeliveryMode,
}

impl<'a> CaptureHooks<'a> {
    pub fn new(catalog: &'a dyn Catalog, config: &'a TrackerConfig, mode: DeliveryMode) -> Self {
        Self {
            normalizer: ItemNormalizer::new(catalog, config),
            mode,
        }
    }

    fn tier(&self, kind: EventKind) -> BufferTier {
        Strategy::for_event(kind, self.mode).tier()
    }

    /// `product_ids` in render order. Positions are 1-based and count only the
    /// products that resolved.
    pub async fn listing_rendered(
        &self,
        buffers: &mut CaptureBuffers,
        context: ListContext,
        product_ids: &[ProductId],
    ) -> CaptureOutcome {
        let kind = EventKind::ViewItemList;
        let tier = self.tier(kind);
        let mut outcome = CaptureOutcome::default();
        let mut index = 1;

        for &id in product_ids {
            let Some(resolved) = self.normalizer.resolve(id, None) else {
                tracing::debug!(event = %kind, product_id = %id, "unresolvable product skipped");
                outcome.skipped += 1;
                continue;
            };
            let item = self.normalizer.listed_item(&resolved, context, index);
            tracing::debug!(event = %kind, item_id = %item.item_id, index, list = context.list_id(), "captured");
            buffers.append(tier, kind, item).await;
            outcome.captured += 1;
            index += 1;
        }
        outcome
    }

    pub async fn product_rendered(
        &self,
        buffers: &mut CaptureBuffers,
        product_id: ProductId,
    ) -> CaptureOutcome {
        let kind = EventKind::ViewItem;
        let Some(resolved) = self.normalizer.resolve(product_id, None) else {
            tracing::debug!(event = %kind, %product_id, "unresolvable product skipped");
            return CaptureOutcome { captured: 0, skipped: 1 };
        };
        let item = self.normalizer.item(&resolved);
        self.capture(buffers, kind, item).await
    }

    pub async fn item_added(
        &self,
        buffers: &mut CaptureBuffers,
        product_id: ProductId,
        variation_id: Option<ProductId>,
        quantity: u32,
    ) -> CaptureOutcome {
        self.cart_mutation(buffers, EventKind::AddToCart, product_id, variation_id, quantity)
            .await
    }

    pub async fn item_removed(
        &self,
        buffers: &mut CaptureBuffers,
        line: &CartLine,
    ) -> CaptureOutcome {
        self.cart_mutation(
            buffers,
            EventKind::RemoveFromCart,
            line.product_id,
            line.variation_id,
            line.quantity,
        )
        .await
    }

    pub async fn checkout_started(
        &self,
        buffers: &mut CaptureBuffers,
        cart: &Cart,
    ) -> CaptureOutcome {
        let kind = EventKind::BeginCheckout;
        let tier = self.tier(kind);
        let mut outcome = CaptureOutcome::default();

        // One cart snapshot per request; later signals would duplicate every line.
        if !buffers.is_empty(tier, kind).await {
            tracing::debug!(event = %kind, "checkout already captured for this request");
            return outcome;
        }

        for line in &cart.lines {
            let Some(resolved) = self.normalizer.resolve(line.product_id, line.variation_id) else {
                tracing::debug!(event = %kind, cart_key = %line.key, "unresolvable cart line skipped");
                outcome.skipped += 1;
                continue;
            };
            let item = self.normalizer.line_item(&resolved, line.quantity);
            tracing::debug!(event = %kind, item_id = %item.item_id, quantity = line.quantity, "captured");
            buffers.append(tier, kind, item).await;
            outcome.captured += 1;
        }
        outcome
    }

    /// Lines carry the finalized price from the order, not the current catalog price.
    pub fn order_finalized(&self, order: &Order) -> PurchaseCapture {
        let kind = EventKind::Purchase;
        let items = order
            .lines
            .iter()
            .filter_map(|line| {
                let Some(resolved) = self.normalizer.resolve(line.product_id, line.variation_id)
                else {
                    tracing::debug!(
                        event = %kind,
                        order_id = order.id,
                        product_id = %line.product_id,
                        "unresolvable order line skipped"
                    );
                    return None;
                };
                let mut item = self.normalizer.line_item(&resolved, line.quantity);
                if line.price.is_finite() && line.price >= 0.0 {
                    item.price = line.price;
                }
                Some(item)
            })
            .collect();

        PurchaseCapture {
            items,
            summary: PurchaseSummary {
                transaction_id: order.id.to_string(),
                value: order.total,
                tax: order.tax,
                shipping: order.shipping,
                coupon: order.coupon.clone(),
            },
        }
    }

    async fn cart_mutation(
        &self,
        buffers: &mut CaptureBuffers,
        kind: EventKind,
        product_id: ProductId,
        variation_id: Option<ProductId>,
        quantity: u32,
    ) -> CaptureOutcome {
        let Some(resolved) = self.normalizer.resolve(product_id, variation_id) else {
            tracing::debug!(event = %kind, %product_id, "unresolvable product skipped");
            return CaptureOutcome { captured: 0, skipped: 1 };
        };
        let item = self.normalizer.line_item(&resolved, quantity);
        self.capture(buffers, kind, item).await
    }

    async fn capture(
        &self,
        buffers: &mut CaptureBuffers,
        kind: EventKind,
        item: EventItem,
    ) -> CaptureOutcome {
        let tier = self.tier(kind);
        tracing::debug!(event = %kind, item_id = %item.item_id, ?tier, "captured");
        buffers.append(tier, kind, item).await;
        CaptureOutcome { captured: 1, skipped: 0 }
    }
}
