use std::{collections::BTreeSet, sync::Arc};

use cartbeacon_core::{Endpoint, ProductId, RequestContext, SessionId, Tracker};

mod common;
use common::{RUNNER, WALKER, catalog, tracker};

async fn add(
    tracker: Tracker,
    catalog: Arc<cartbeacon_core::MemoryCatalog>,
    session: SessionId,
    id: ProductId,
) {
    let mut request =
        tracker.begin_request(&*catalog, RequestContext::asynchronous(Some(session)));
    request.on_item_added(id, None, 1).await;
    request.finish().await;
}

async fn drain(tracker: Tracker, session: SessionId) -> Vec<String> {
    let response = tracker.retrieve(Some(session), Endpoint::AddToCart).await;
    if !response.is_found() {
        return Vec::new();
    }
    let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    body["ecommerce"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["item_id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_adds_and_drains_deliver_each_item_once() {
    let catalog = Arc::new(catalog());

    for _ in 0..200 {
        let tracker = tracker();
        let session = SessionId::new();

        let a = tokio::spawn(add(tracker.clone(), Arc::clone(&catalog), session, RUNNER));
        let b = tokio::spawn(add(tracker.clone(), Arc::clone(&catalog), session, WALKER));
        let d1 = tokio::spawn(drain(tracker.clone(), session));
        let d2 = tokio::spawn(drain(tracker.clone(), session));

        a.await.unwrap();
        b.await.unwrap();
        let mut seen = d1.await.unwrap();
        seen.extend(d2.await.unwrap());
        // Whatever the racing drains missed is still pending.
        seen.extend(drain(tracker.clone(), session).await);

        seen.sort();
        assert_eq!(seen, vec!["10".to_string(), "11".to_string()]);
        assert!(drain(tracker, session).await.is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_writers_lose_nothing() {
    let catalog = Arc::new(catalog());
    let tracker = tracker();
    let session = SessionId::new();

    let mut writers = Vec::new();
    for i in 0..64 {
        let id = if i % 2 == 0 { RUNNER } else { WALKER };
        writers.push(tokio::spawn(add(tracker.clone(), Arc::clone(&catalog), session, id)));
    }
    let mut drains = Vec::new();
    for _ in 0..8 {
        drains.push(tokio::spawn(drain(tracker.clone(), session)));
    }

    for w in writers {
        w.await.unwrap();
    }
    let mut total = 0;
    for d in drains {
        total += d.await.unwrap().len();
    }
    total += drain(tracker, session).await.len();

    assert_eq!(total, 64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_purchase_retrievals_find_it_once() {
    let catalog = catalog();

    for _ in 0..100 {
        let tracker = tracker();
        let session = Some(SessionId::new());
        let order = cartbeacon_core::Order {
            id: 42,
            total: 199.99,
            tax: None,
            shipping: None,
            coupon: None,
            lines: vec![cartbeacon_core::OrderLine {
                product_id: RUNNER,
                variation_id: None,
                quantity: 1,
                price: 199.99,
            }],
        };
        let mut request = tracker.begin_request(&catalog, RequestContext::asynchronous(session));
        request.on_order_finalized(&order).await;
        request.finish().await;

        let t1 = tracker.clone();
        let t2 = tracker.clone();
        let r1 = tokio::spawn(async move { t1.retrieve(session, Endpoint::Purchase).await });
        let r2 = tokio::spawn(async move { t2.retrieve(session, Endpoint::Purchase).await });

        let found: BTreeSet<bool> = [r1.await.unwrap().is_found(), r2.await.unwrap().is_found()]
            .into_iter()
            .collect();
        assert_eq!(found, BTreeSet::from([true, false]));
    }
}
