//! Product and category lookups the capture hooks depend on.

use std::collections::HashMap;

use crate::types::{Category, CategoryId, Product, ProductId};

/// Read access to the storefront catalog.
///
/// Both lookups are total: a missing product is `None`, a product without
/// categories yields an empty list.
pub trait Catalog: Send + Sync {
    fn product(&self, id: ProductId) -> Option<Product>;
    fn categories(&self, id: ProductId) -> Vec<Category>;
}

/// In-memory catalog for tests and the simulator.
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    products: HashMap<ProductId, Product>,
    categories: HashMap<CategoryId, Category>,
    assignments: HashMap<ProductId, Vec<CategoryId>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, id: CategoryId, name: &str, parent: Option<CategoryId>) -> Self {
        self.categories.insert(
            id,
            Category {
                id,
                name: name.to_string(),
                parent,
            },
        );
        self
    }

    /// Adds `product`, assigned to `category_ids` in the given order.
    pub fn with_product(mut self, product: Product, category_ids: &[CategoryId]) -> Self {
        self.assignments.insert(product.id, category_ids.to_vec());
        self.products.insert(product.id, product);
        self
    }

    pub fn remove_product(&mut self, id: ProductId) -> Option<Product> {
        self.assignments.remove(&id);
        self.products.remove(&id)
    }
}

impl Catalog for MemoryCatalog {
    fn product(&self, id: ProductId) -> Option<Product> {
        self.products.get(&id).cloned()
    }

    fn categories(&self, id: ProductId) -> Vec<Category> {
        self.assignments
            .get(&id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|cid| self.categories.get(cid).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}
