#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use cartbeacon_core::{
    Cart, CartLine, MemoryCatalog, MemorySessionStore, Product, ProductId, SessionId,
    SessionStore, StoreError, Tracker, TrackerConfig,
};
use serde_json::Value;

pub const RUNNER: ProductId = ProductId(10);
pub const WALKER: ProductId = ProductId(11);
pub const TEE: ProductId = ProductId(20);
pub const TEE_RED_L: ProductId = ProductId(21);
pub const UNBRANDED: ProductId = ProductId(30);

/// Shoes (root) > Running; Apparel (root) > Shirts; a simple product without categories.
pub fn catalog() -> MemoryCatalog {
    MemoryCatalog::new()
        .with_category(1, "Shoes", None)
        .with_category(2, "Running", Some(1))
        .with_category(3, "Apparel", None)
        .with_category(4, "Shirts", Some(3))
        .with_product(
            Product::simple(10, "Trail Runner", 199.99).with_attribute("pa_brand", "Acme"),
            &[2, 1],
        )
        .with_product(
            Product::simple(11, "City Walker", 89.5).with_attribute("pa_brand", "Acme"),
            &[1],
        )
        .with_product(
            Product::simple(20, "Basic Tee", 20.0).with_attribute("pa_brand", "Loom"),
            &[4, 3],
        )
        .with_product(
            Product::variation(
                21,
                20,
                "Basic Tee - Red, L",
                22.0,
                vec![
                    ("pa_color".to_string(), "Red".to_string()),
                    ("pa_size".to_string(), "L".to_string()),
                ],
            ),
            &[],
        )
        .with_product(Product::simple(30, "Gift Card", 50.0), &[])
}

pub fn store() -> Arc<MemorySessionStore> {
    Arc::new(MemorySessionStore::new(Duration::from_secs(3600)))
}

pub fn tracker() -> Tracker {
    Tracker::new(TrackerConfig::default(), store())
}

pub fn cart(lines: &[(ProductId, Option<ProductId>, u32)]) -> Cart {
    Cart {
        lines: lines
            .iter()
            .enumerate()
            .map(|(i, &(product_id, variation_id, quantity))| CartLine {
                key: format!("line-{i}"),
                product_id,
                variation_id,
                quantity,
            })
            .collect(),
    }
}

/// A session store whose backend is down.
pub struct UnavailableStore;

#[async_trait]
impl SessionStore for UnavailableStore {
    async fn get(&self, _: SessionId, _: &str) -> Result<Option<Value>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn set(&self, _: SessionId, _: &str, _: Value) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn clear(&self, _: SessionId, _: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn append(&self, _: SessionId, _: &str, _: Value) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn take(&self, _: SessionId, _: &str) -> Result<Option<Value>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}
