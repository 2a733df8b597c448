use crate::{
    catalog::Catalog,
    config::TrackerConfig,
    events::{EventItem, ListContext},
    types::{Category, Product, ProductId, ProductKind},
};

/// A product resolved to the entity that was shown or sold (`line`) and the
/// entity that carries its catalog identity (`identity`, the parent for variations).
#[derive(Debug, Clone)]
pub struct ResolvedProduct {
    pub line: Product,
    pub identity: Product,
}

/// Turns catalog entities into [`EventItem`]s.
pub struct ItemNormalizer<'a> {
    catalog: &'a dyn Catalog,
    config: &'a TrackerConfig,
}

impl<'a> ItemNormalizer<'a> {
    pub fn new(catalog: &'a dyn Catalog, config: &'a TrackerConfig) -> Self {
        Self { catalog, config }
    }

    /// Resolves `product_id`, or `variation_id` when given, to a sellable product.
    ///
    /// Returns `None` for stale identifiers, including variations whose parent
    /// no longer exists.
    pub fn resolve(
        &self,
        product_id: ProductId,
        variation_id: Option<ProductId>,
    ) -> Option<ResolvedProduct> {
        let line = self.catalog.product(variation_id.unwrap_or(product_id))?;
        let identity = match line.parent_id() {
            Some(parent) => self.catalog.product(parent)?,
            None => line.clone(),
        };
        Some(ResolvedProduct { line, identity })
    }

    /// Base item with no quantity and no listing position.
    pub fn item(&self, resolved: &ResolvedProduct) -> EventItem {
        let categories = self.catalog.categories(resolved.identity.id);
        let (item_category, item_category2) = pick_categories(&categories);

        EventItem {
            item_id: resolved.line.id.to_string(),
            item_name: resolved.line.name.clone(),
            price: sanitize_price(resolved.line.id, resolved.line.price),
            item_brand: self.brand(resolved),
            item_category,
            item_category2,
            item_variant: variant_label(&resolved.line),
            quantity: None,
            item_list_id: None,
            item_list_name: None,
            index: None,
            google_business_vertical: self.config.business_vertical.clone(),
        }
    }

    pub fn listed_item(
        &self,
        resolved: &ResolvedProduct,
        context: ListContext,
        index: u32,
    ) -> EventItem {
        EventItem {
            item_list_id: Some(context.list_id().to_string()),
            item_list_name: Some(context.list_name().to_string()),
            index: Some(index),
            ..self.item(resolved)
        }
    }

    pub fn line_item(&self, resolved: &ResolvedProduct, quantity: u32) -> EventItem {
        EventItem {
            quantity: Some(quantity.max(1)),
            ..self.item(resolved)
        }
    }

    fn brand(&self, resolved: &ResolvedProduct) -> String {
        let attr = &self.config.brand_attribute;
        resolved
            .identity
            .attributes
            .get(attr)
            .or_else(|| resolved.line.attributes.get(attr))
            .cloned()
            .unwrap_or_default()
    }
}

/// First root category, else the first category at all; then the first other
/// category whose name differs from it.
pub fn pick_categories(categories: &[Category]) -> (String, String) {
    let primary = categories
        .iter()
        .find(|c| c.is_root())
        .or_else(|| categories.first())
        .map(|c| c.name.clone())
        .unwrap_or_default();

    let secondary = categories
        .iter()
        .find(|c| c.name != primary)
        .map(|c| c.name.clone())
        .unwrap_or_default();

    (primary, secondary)
}

fn variant_label(product: &Product) -> String {
    match &product.kind {
        ProductKind::Simple => String::new(),
        ProductKind::Variation { attributes, .. } => attributes
            .iter()
            .map(|(_, value)| value.as_str())
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn sanitize_price(id: ProductId, price: Option<f64>) -> f64 {
    match price {
        Some(p) if p.is_finite() && p >= 0.0 => p,
        Some(p) => {
            tracing::warn!(product_id = %id, price = p, "invalid price, reporting 0");
            0.0
        }
        None => 0.0,
    }
}
