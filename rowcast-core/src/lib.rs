//! # Rowcast Core
//!
//! Engine behind a categorized poster carousel for TV-style interfaces:
//! rows of artwork tiles, one row per category, navigated with a remote.
//!
//! ## Overview
//!
//! - **Content**: a flat item list grouped into rows by category
//! - **Layout**: per-category tile geometry stacked into a row column
//! - **Visibility**: which tiles are on or near screen for the current scroll
//! - **Loading**: one in-flight fetch per tile, placeholders on failure
//! - **Cache**: textures keyed by item index, bounded by a two-pass eviction
//! - **Navigation**: focus movement with eased scroll animation
//! - **Lifecycle**: idempotent teardown with deferred node release
//!
//! The rendering backend is abstracted by [`surface::RenderSurface`];
//! [`surface::HeadlessSurface`] records operations and is what the tests and
//! the player binary drive.
//!
//! ## Architecture
//!
//! [`view::CarouselView`] owns all state and is driven from one thread. Fetches
//! run on a tokio runtime and report through a channel the view drains with
//! [`view::CarouselView::pump_completions`].
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use rowcast_core::{
//!     CarouselDeps, CarouselKey, CarouselTuning, CarouselView, CategoryLayoutModel,
//!     ContentIndex, HeadlessSurface, HttpImageFetcher, NavDiagnostics,
//! };
//! use rowcast_model::Item;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = tokio::runtime::Runtime::new()?;
//! let deps = CarouselDeps {
//!     surface: Arc::new(HeadlessSurface::new()),
//!     fetcher: Arc::new(HttpImageFetcher::new()?),
//!     runtime: runtime.handle().clone(),
//!     diagnostics: Arc::new(NavDiagnostics::new()),
//! };
//! let (mut view, _events) = CarouselView::new(CarouselTuning::default(), deps);
//! view.set_viewport(1280.0, 720.0);
//! view.set_content(
//!     ContentIndex::new(vec![Item::new(0, "Movies", "Heat", "heat.jpg")], vec![]),
//!     CategoryLayoutModel::default(),
//! );
//! view.handle_key(CarouselKey::Right);
//! # Ok(())
//! # }
//! ```

pub mod animator;
pub mod cache;
pub mod constants;
pub mod content;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod frame;
pub mod layout;
pub mod lifecycle;
pub mod loading;
pub mod navigation;
pub mod scroll;
pub mod settings;
pub mod surface;
pub mod view;
pub mod visibility;

pub use cache::{CacheStats, EvictionReason, TextureCache};
pub use content::ContentIndex;
pub use diagnostics::NavDiagnostics;
pub use error::{CarouselError, Result};
pub use events::{CarouselEvent, CarouselKey, KeyResponse};
pub use frame::Frame;
pub use layout::CategoryLayoutModel;
pub use lifecycle::LifecyclePhase;
pub use loading::{HttpImageFetcher, ImageFetcher};
pub use navigation::{Direction, NavOutcome};
pub use scroll::Viewport;
pub use settings::CarouselTuning;
pub use surface::{HeadlessSurface, RenderSurface};
pub use view::{CarouselDeps, CarouselStats, CarouselView};
pub use visibility::VisibleSet;
