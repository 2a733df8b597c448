//! Cartbeacon Core Library
//!
//! Captures storefront commerce state at lifecycle points, buffers it per
//! request or per session, and delivers exactly one ecommerce event per user
//! action to the client-side analytics queue, either inline in the rendered
//! page or through a side channel the client fetches after an async action.

pub mod bridge;
pub mod buffer;
pub mod capture;
pub mod catalog;
pub mod client;
pub mod config;
pub mod dedup;
pub mod emitter;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod store;
pub mod types;

// Re-export commonly used items at crate root
pub use bridge::{Endpoint, InlineOutput, Retrieval, RetrievalResponse, Strategy};
pub use buffer::DeliveryMode;
pub use catalog::{Catalog, MemoryCatalog};
pub use client::{ClientRuntime, DataLayer};
pub use config::TrackerConfig;
pub use dedup::{DedupGuard, NavigationTokens};
pub use emitter::Emitter;
pub use error::{Result, StoreError, TrackerError};
pub use events::{Envelope, EventItem, EventKind, ListContext};
pub use lifecycle::{MetricsSnapshot, RequestContext, RequestLifecycle, Tracker};
pub use store::{MemorySessionStore, SessionId, SessionStore};
pub use types::{Cart, CartLine, Category, Order, OrderLine, Product, ProductId, ProductKind};
