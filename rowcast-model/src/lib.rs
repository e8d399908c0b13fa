//! Core data model definitions shared across rowcast crates.
//!
//! Everything here is plain data: items as they were loaded from the content
//! source, the per-category tile geometry, and the payloads handed to
//! consumers when the user acts on a tile.

pub mod action;
pub mod error;
pub mod item;
pub mod layout;

pub use action::ActionPayload;
pub use error::{ModelError, Result as ModelResult};
pub use item::{Item, ItemLinks};
pub use layout::{CategoryLayout, ItemMetrics};
