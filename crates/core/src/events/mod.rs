pub mod envelope;
pub mod item;
pub mod kind;

pub use envelope::*;
pub use item::*;
pub use kind::*;
