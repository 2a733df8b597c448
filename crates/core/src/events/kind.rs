use serde::{Deserialize, Serialize};

/// The fixed set of commerce events this crate reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ViewItemList,
    ViewItem,
    AddToCart,
    RemoveFromCart,
    BeginCheckout,
    Purchase,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::ViewItemList,
        EventKind::ViewItem,
        EventKind::AddToCart,
        EventKind::RemoveFromCart,
        EventKind::BeginCheckout,
        EventKind::Purchase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ViewItemList => "view_item_list",
            EventKind::ViewItem => "view_item",
            EventKind::AddToCart => "add_to_cart",
            EventKind::RemoveFromCart => "remove_from_cart",
            EventKind::BeginCheckout => "begin_checkout",
            EventKind::Purchase => "purchase",
        }
    }

    /// Kinds that several lifecycle signals may trigger within one navigation
    /// but that must reach the client queue at most once.
    pub fn is_one_shot(&self) -> bool {
        match self {
            EventKind::BeginCheckout => true,
            EventKind::ViewItemList
            | EventKind::ViewItem
            | EventKind::AddToCart
            | EventKind::RemoveFromCart
            | EventKind::Purchase => false,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a product listing was rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListContext {
    Shop,
    Category,
    Search,
    Home,
}

impl ListContext {
    pub fn list_id(&self) -> &'static str {
        match self {
            ListContext::Shop => "shop_page",
            ListContext::Category => "category_page",
            ListContext::Search => "search_page",
            ListContext::Home => "homepage_page",
        }
    }

    pub fn list_name(&self) -> &'static str {
        match self {
            ListContext::Shop => "Shop Page",
            ListContext::Category => "Category Page",
            ListContext::Search => "Search Page",
            ListContext::Home => "Home Page",
        }
    }
}
