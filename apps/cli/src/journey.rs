use std::sync::Arc;

use cartbeacon_core::{
    ClientRuntime, Endpoint, InlineOutput, ListContext, MemoryCatalog, MemorySessionStore,
    MetricsSnapshot, RequestContext, SessionId, Tracker, TrackerConfig,
};
use console::style;

use crate::storefront::{self, BOTTLE, JACKET, JACKET_BLUE_M, RUNNER};

pub struct JourneyReport {
    pub client: ClientRuntime,
    pub scripts: Vec<(&'static str, String)>,
    pub metrics: MetricsSnapshot,
}

/// One shopper, one session, from the shop page to a paid order.
pub struct Journey {
    tracker: Tracker,
    catalog: MemoryCatalog,
    session: Option<SessionId>,
    client: ClientRuntime,
    scripts: Vec<(&'static str, String)>,
}

impl Journey {
    pub fn new(config: TrackerConfig) -> Self {
        let store = Arc::new(MemorySessionStore::new(config.session_ttl()));
        let client = ClientRuntime::new(&config);
        Self {
            tracker: Tracker::new(config, store),
            catalog: storefront::demo_catalog(),
            session: Some(SessionId::new()),
            client,
            scripts: Vec::new(),
        }
    }

    pub async fn run(mut self) -> JourneyReport {
        self.shop_page().await;
        self.product_page().await;
        self.async_add().await;
        self.cart_page().await;
        self.checkout().await;
        self.purchase().await;

        JourneyReport {
            metrics: self.tracker.metrics(),
            client: self.client,
            scripts: self.scripts,
        }
    }

    async fn shop_page(&mut self) {
        self.client.new_navigation();
        let mut request = self
            .tracker
            .begin_request(&self.catalog, RequestContext::full_page(self.session));
        request
            .on_listing_rendered(ListContext::Shop, &storefront::shop_page())
            .await;
        let output = request.finish().await;
        self.render("shop page", output);
    }

    async fn product_page(&mut self) {
        self.client.new_navigation();
        let mut request = self
            .tracker
            .begin_request(&self.catalog, RequestContext::full_page(self.session));
        request.on_product_rendered(JACKET).await;
        let output = request.finish().await;
        self.render("product page", output);
    }

    async fn async_add(&mut self) {
        let mut request = self
            .tracker
            .begin_request(&self.catalog, RequestContext::asynchronous(self.session));
        request.on_item_added(JACKET, Some(JACKET_BLUE_M), 1).await;
        request.on_item_added(RUNNER, None, 2).await;
        request.on_item_added(BOTTLE, None, 1).await;
        // The async response carries no inline output.
        request.finish().await;

        let response = self.tracker.retrieve(self.session, Endpoint::AddToCart).await;
        let applied = self.client.apply_side_channel(&response);
        step("async add to cart", applied, Endpoint::AddToCart.path());
    }

    async fn cart_page(&mut self) {
        self.client.new_navigation();
        let mut request = self
            .tracker
            .begin_request(&self.catalog, RequestContext::full_page(self.session));
        request.on_item_removed(&storefront::bottle_line()).await;
        let output = request.finish().await;
        self.render("remove from cart page", output);
    }

    /// The checkout page fires twice: once on render and once when the
    /// storefront refreshes the order review over async.
    async fn checkout(&mut self) {
        self.client.new_navigation();
        let cart = storefront::cart_after_adds();

        for label in ["checkout page", "checkout review refresh"] {
            let mut request = self
                .tracker
                .begin_request(&self.catalog, RequestContext::full_page(self.session));
            request.on_checkout_started(&cart).await;
            request.on_checkout_started(&cart).await;
            let output = request.finish().await;
            self.render(label, output);
        }
    }

    async fn purchase(&mut self) {
        let order = storefront::order_from(&storefront::cart_after_adds(), 70_001, &self.catalog);
        let mut request = self
            .tracker
            .begin_request(&self.catalog, RequestContext::asynchronous(self.session));
        request.on_order_finalized(&order).await;
        request.finish().await;

        self.client.new_navigation();
        for attempt in 1..=2 {
            let response = self.tracker.retrieve(self.session, Endpoint::Purchase).await;
            let applied = self.client.apply_side_channel(&response);
            step(
                &format!("purchase retrieval #{attempt}"),
                applied,
                &format!("{} -> {}", Endpoint::Purchase.path(), response.status),
            );
        }
    }

    fn render(&mut self, label: &'static str, output: InlineOutput) {
        let pushed = output
            .envelopes
            .iter()
            .filter(|envelope| self.client.push(envelope))
            .count();
        step(
            label,
            pushed > 0,
            &format!("{}/{} envelopes pushed", pushed, output.envelopes.len()),
        );
        self.scripts.push((label, output.script));
    }
}

fn step(label: &str, pushed: bool, detail: &str) {
    let mark = if pushed {
        style("✓").green().bold()
    } else {
        style("·").dim()
    };
    println!("{} {} {}", mark, label, style(format!("({detail})")).dim());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn journey_pushes_each_action_once() {
        let report = Journey::new(TrackerConfig::default()).run().await;
        let queue = report.client.data_layer();

        for kind in [
            "view_item_list",
            "view_item",
            "add_to_cart",
            "remove_from_cart",
            "begin_checkout",
            "purchase",
        ] {
            assert_eq!(queue.events_named(kind).len(), 1, "{kind}");
        }
        assert_eq!(queue.len(), 12);

        let listed = &queue.events_named("view_item_list")[0]["ecommerce"]["items"];
        assert_eq!(listed.as_array().map(Vec::len), Some(3));

        let purchase = queue.events_named("purchase")[0];
        assert_eq!(purchase["ecommerce"]["transaction_id"], "70001");
        assert_eq!(purchase["ecommerce"]["shipping"], 120.0);

        assert_eq!(report.metrics.skipped, 1);
        // Both checkout renders emit; the client guard drops the second.
        assert_eq!(report.metrics.emitted, 7);
        assert_eq!(report.metrics.suppressed, 0);
        assert_eq!(report.metrics.retrieved, 2);
        assert_eq!(report.metrics.retrieval_misses, 1);
    }

    #[tokio::test]
    async fn checkout_script_is_rendered_on_every_response() {
        let report = Journey::new(TrackerConfig::default()).run().await;
        let checkout_scripts = report
            .scripts
            .iter()
            .filter(|(_, script)| script.contains("begin_checkout"))
            .count();

        assert_eq!(checkout_scripts, 2);
    }
}
