//! Configuration and content loading for rowcast.
//!
//! Three inputs feed a carousel: the tuning knobs (`CarouselTuning`), the
//! UI layout settings that size each category's tiles, and the menu
//! document that provides the rows and items. Each loader here degrades to a
//! usable default instead of failing, and reports where its result came
//! from so callers can log it.

pub mod error;
pub mod loader;
pub mod models;

pub use error::ContentError;
pub use loader::{
    CatalogPaths, ContentSource, LayoutSource, LoadedCatalog, load_catalog,
};
pub use models::menu::{Catalog, parse_menu};
pub use models::settings::{LayoutSettings, PRESET_ALIASES, parse_layout_settings};
pub use models::tuning::{
    TuningSource, load_tuning_from_env, load_tuning_from_file, parse_tuning,
    resolve_tuning,
};
