//! UI layout settings: row spacing, title height and per-category tile
//! sizes from the `uiConfigurations.STB.kv3` document.

use std::collections::BTreeMap;

use rowcast_core::CategoryLayoutModel;
use rowcast_core::constants::layout::{ROW_SPACING, TITLE_HEIGHT};
use rowcast_model::{CategoryLayout, ItemMetrics};
use serde::Deserialize;

use crate::error::ContentError;

/// Swimlane preset names and the content categories they size.
pub const PRESET_ALIASES: &[(&str, &[&str])] = &[
    ("default", &["Default"]),
    ("landscapeType1", &["TV Channels"]),
    ("landscapeType2", &["Live Channels", "TV Channels", "Live TV"]),
    ("portraitType1", &["Movies", "Bein Series", "TV Shows"]),
    ("heroBanner", &["Featured"]),
    ("settings", &["Settings"]),
    ("landScapeTypeChannelInfo", &["On Demand"]),
];

const LANDSCAPE: CategoryLayout = CategoryLayout {
    tile_width: 240.0,
    tile_height: 135.0,
    row_height: 131.0,
    item_spacing: 24.0,
};

const PORTRAIT: CategoryLayout = CategoryLayout {
    tile_width: 152.0,
    tile_height: 228.0,
    row_height: 224.0,
    item_spacing: 24.0,
};

/// Resolved layout settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSettings {
    pub title_height: f32,
    pub row_spacing: f32,
    /// Sizes for categories without an explicit layout.
    pub metrics: ItemMetrics,
    pub categories: BTreeMap<String, CategoryLayout>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            title_height: TITLE_HEIGHT,
            row_spacing: ROW_SPACING,
            metrics: ItemMetrics::default(),
            categories: BTreeMap::new(),
        }
    }
}

impl LayoutSettings {
    /// Built-in layouts used when no settings document can be read.
    pub fn fallback() -> Self {
        let mut categories = BTreeMap::new();
        for name in ["TV Channels", "Live TV"] {
            categories.insert(name.to_string(), LANDSCAPE);
        }
        for name in ["TV Shows", "Movies", "Bein Series"] {
            categories.insert(name.to_string(), PORTRAIT);
        }
        Self {
            title_height: 15.0,
            row_spacing: 6.0,
            metrics: ItemMetrics {
                item_width: LANDSCAPE.tile_width,
                item_height: LANDSCAPE.tile_height,
                item_spacing: LANDSCAPE.item_spacing,
            },
            categories,
        }
    }

    pub fn into_layout_model(self, left_margin: f32) -> CategoryLayoutModel {
        let mut model = CategoryLayoutModel::new(self.metrics)
            .with_title_height(self.title_height)
            .with_row_spacing(self.row_spacing)
            .with_left_margin(left_margin);
        for (category, layout) in self.categories {
            model.insert(category, layout);
        }
        model
    }

    fn apply_presets(&mut self, presets: &BTreeMap<String, PresetDims>) {
        for (preset, dims) in presets {
            let Some(layout) = dims.to_layout() else {
                tracing::warn!("skipping swimlane preset {preset}: incomplete dimensions");
                continue;
            };
            if preset == "default" {
                self.metrics = ItemMetrics {
                    item_width: layout.tile_width,
                    item_height: layout.tile_height,
                    item_spacing: layout.item_spacing,
                };
            }
            for category in categories_for(preset) {
                self.categories.insert(category, layout);
            }
        }
    }
}

/// Categories a preset applies to. Unknown presets name their category
/// directly.
fn categories_for(preset: &str) -> Vec<String> {
    PRESET_ALIASES
        .iter()
        .find(|(name, _)| *name == preset)
        .map(|(_, categories)| categories.iter().map(|c| c.to_string()).collect())
        .unwrap_or_else(|| vec![preset.to_string()])
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SettingsDocument {
    ui_configurations: Option<UiConfigurations>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UiConfigurations {
    #[serde(rename = "STB")]
    stb: Option<StbConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StbConfig {
    kv3: Option<Kv3Config>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Kv3Config {
    row_spacing: Option<f32>,
    row_title: RowTitleConfig,
    swimlane_size_configuration: SwimlaneConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RowTitleConfig {
    #[serde(rename = "Height")]
    height: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SwimlaneConfig {
    poster: BTreeMap<String, PresetDims>,
    /// Applied after `poster`, so it takes precedence.
    poster_with_meta_data: BTreeMap<String, PresetDims>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PresetDims {
    height: Option<f32>,
    poster_height: Option<f32>,
    poster_width: Option<f32>,
    item_spacing: Option<f32>,
}

impl PresetDims {
    fn to_layout(&self) -> Option<CategoryLayout> {
        let width = self.poster_width.filter(|w| *w > 0.0)?;
        let height = self.poster_height.filter(|h| *h > 0.0)?;
        CategoryLayout::new(
            width,
            height,
            self.height.unwrap_or(height),
            self.item_spacing.unwrap_or(0.0),
        )
        .ok()
    }
}

/// Parse a layout settings document.
///
/// Missing sections keep their defaults; only unreadable JSON or a document
/// without the `uiConfigurations.STB.kv3` block is an error.
pub fn parse_layout_settings(raw: &str) -> Result<LayoutSettings, ContentError> {
    let document: SettingsDocument = serde_json::from_str(raw)?;
    let kv3 = document
        .ui_configurations
        .and_then(|ui| ui.stb)
        .and_then(|stb| stb.kv3)
        .ok_or(ContentError::MissingSection("uiConfigurations.STB.kv3"))?;

    let mut settings = LayoutSettings::default();
    if let Some(spacing) = kv3.row_spacing.filter(|s| s.is_finite() && *s >= 0.0) {
        settings.row_spacing = spacing;
    }
    if let Some(height) = kv3.row_title.height.filter(|h| h.is_finite() && *h >= 0.0) {
        settings.title_height = height;
    }
    settings.apply_presets(&kv3.swimlane_size_configuration.poster);
    settings.apply_presets(&kv3.swimlane_size_configuration.poster_with_meta_data);

    tracing::debug!(
        "layout settings: {} category layouts, row spacing {}, title height {}",
        settings.categories.len(),
        settings.row_spacing,
        settings.title_height
    );
    Ok(settings)
}
