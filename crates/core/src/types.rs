use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub u64);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type CategoryId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// `None` for a root category.
    pub parent: Option<CategoryId>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProductKind {
    Simple,
    Variation {
        parent: ProductId,
        /// Attribute name/value pairs that define this variation, in display order.
        attributes: Vec<(String, String)>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Current price from the pricing engine; `None` when the product has no price set.
    pub price: Option<f64>,
    pub kind: ProductKind,
    pub attributes: BTreeMap<String, String>,
}

impl Product {
    pub fn simple(id: u64, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: ProductId(id),
            name: name.into(),
            price: Some(price),
            kind: ProductKind::Simple,
            attributes: BTreeMap::new(),
        }
    }

    pub fn variation(
        id: u64,
        parent: u64,
        name: impl Into<String>,
        price: f64,
        attributes: Vec<(String, String)>,
    ) -> Self {
        Self {
            id: ProductId(id),
            name: name.into(),
            price: Some(price),
            kind: ProductKind::Variation {
                parent: ProductId(parent),
                attributes,
            },
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn parent_id(&self) -> Option<ProductId> {
        match &self.kind {
            ProductKind::Simple => None,
            ProductKind::Variation { parent, .. } => Some(*parent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub key: String,
    pub product_id: ProductId,
    pub variation_id: Option<ProductId>,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub variation_id: Option<ProductId>,
    pub quantity: u32,
    /// Finalized unit price for this line.
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub total: f64,
    pub tax: Option<f64>,
    pub shipping: Option<f64>,
    pub coupon: Option<String>,
    pub lines: Vec<OrderLine>,
}
