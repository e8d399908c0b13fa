//! Loading the carousel's content and layouts from disk.

use std::fs;
use std::path::{Path, PathBuf};

use rowcast_core::{CarouselTuning, CategoryLayoutModel, ContentIndex};

use crate::error::ContentError;
use crate::models::menu::{Catalog, parse_menu};
use crate::models::settings::{LayoutSettings, parse_layout_settings};

/// Menu document path.
pub const MENU_PATH_ENV: &str = "ROWCAST_MENU_PATH";
/// Layout settings document path.
pub const SETTINGS_PATH_ENV: &str = "ROWCAST_SETTINGS_PATH";

/// Where the menu and layout documents live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPaths {
    pub menu: Option<PathBuf>,
    pub settings: Option<PathBuf>,
}

impl CatalogPaths {
    /// Paths from `ROWCAST_MENU_PATH` and `ROWCAST_SETTINGS_PATH`.
    pub fn from_env() -> Self {
        let path = |key: &str| {
            std::env::var(key)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        };
        Self {
            menu: path(MENU_PATH_ENV),
            settings: path(SETTINGS_PATH_ENV),
        }
    }

    /// Replace paths with explicitly given ones, e.g. from the command line.
    pub fn with_overrides(
        self,
        menu: Option<PathBuf>,
        settings: Option<PathBuf>,
    ) -> Self {
        Self {
            menu: menu.or(self.menu),
            settings: settings.or(self.settings),
        }
    }
}

/// Where the content came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    File(PathBuf),
    /// Built-in test items.
    Placeholder,
}

/// Where the layouts came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutSource {
    File(PathBuf),
    /// Built-in landscape and portrait presets.
    Fallback,
}

#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub content: ContentIndex,
    pub layout: CategoryLayoutModel,
    pub content_source: ContentSource,
    pub layout_source: LayoutSource,
}

/// Load content and layouts. Never fails: unreadable documents fall back to
/// built-in content and layouts, with a warning.
pub fn load_catalog(paths: &CatalogPaths, tuning: &CarouselTuning) -> LoadedCatalog {
    let (settings, layout_source) = match paths.settings.as_deref() {
        Some(path) => match read(path).and_then(|raw| parse_layout_settings(&raw)) {
            Ok(settings) => (settings, LayoutSource::File(path.to_path_buf())),
            Err(err) => {
                tracing::warn!("layout settings unavailable ({err}); using built-in layouts");
                (LayoutSettings::fallback(), LayoutSource::Fallback)
            }
        },
        None => (LayoutSettings::fallback(), LayoutSource::Fallback),
    };

    let (catalog, content_source) = match paths.menu.as_deref() {
        Some(path) => match read(path).and_then(|raw| parse_menu(&raw)) {
            Ok(catalog) => (catalog, ContentSource::File(path.to_path_buf())),
            Err(err) => {
                tracing::warn!("menu content unavailable ({err}); using test items");
                (Catalog::placeholder(), ContentSource::Placeholder)
            }
        },
        None => {
            tracing::info!("no menu document configured; using test items");
            (Catalog::placeholder(), ContentSource::Placeholder)
        }
    };

    let content = catalog.into_content();
    tracing::info!(
        "catalog ready: {} items in {} rows ({:?}, {:?})",
        content.len(),
        content.rows().len(),
        content_source,
        layout_source
    );
    LoadedCatalog {
        content,
        layout: settings.into_layout_model(tuning.left_margin),
        content_source,
        layout_source,
    }
}

fn read(path: &Path) -> Result<String, ContentError> {
    fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })
}
