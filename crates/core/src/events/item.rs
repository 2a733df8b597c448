use serde::{Deserialize, Serialize};

/// One normalized commerce line inside an event.
///
/// Field order is the wire order. Listing fields are only present on
/// `view_item_list` items; `quantity` only on cart and order events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventItem {
    pub item_id: String,
    pub item_name: String,
    pub price: f64,
    pub item_brand: String,
    pub item_category: String,
    pub item_category2: String,
    pub item_variant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_list_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_list_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    pub google_business_vertical: String,
}

impl EventItem {
    /// Total value of the line, used for logging only.
    pub fn line_value(&self) -> f64 {
        self.price * f64::from(self.quantity.unwrap_or(1))
    }
}
