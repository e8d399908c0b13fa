//! Per-category tile geometry.

use crate::error::{ModelError, Result};

/// Extra vertical room added to the item height when a category has no
/// explicit row height.
pub const DEFAULT_ROW_PADDING: f32 = 10.0;

/// Global item metrics used to derive layouts for unconfigured categories.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemMetrics {
    pub item_width: f32,
    pub item_height: f32,
    pub item_spacing: f32,
}

impl Default for ItemMetrics {
    fn default() -> Self {
        Self {
            item_width: 200.0,
            item_height: 200.0,
            item_spacing: 10.0,
        }
    }
}

/// Display geometry of one category row.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryLayout {
    pub tile_width: f32,
    pub tile_height: f32,
    /// Height of the tile band. May be smaller than `tile_height` when the
    /// preset lets posters overhang the row.
    pub row_height: f32,
    pub item_spacing: f32,
}

impl CategoryLayout {
    /// Validated constructor; all dimensions must be finite and non-negative.
    pub fn new(
        tile_width: f32,
        tile_height: f32,
        row_height: f32,
        item_spacing: f32,
    ) -> Result<Self> {
        for (field, value) in [
            ("tile_width", tile_width),
            ("tile_height", tile_height),
            ("row_height", row_height),
            ("item_spacing", item_spacing),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::InvalidDimension { field, value });
            }
        }
        Ok(Self {
            tile_width,
            tile_height,
            row_height,
            item_spacing,
        })
    }

    /// Deterministic layout for a category with no configuration.
    pub fn from_metrics(metrics: &ItemMetrics) -> Self {
        Self {
            tile_width: metrics.item_width,
            tile_height: metrics.item_height,
            row_height: metrics.item_height + DEFAULT_ROW_PADDING,
            item_spacing: metrics.item_spacing,
        }
    }

    /// Horizontal distance between the left edges of adjacent tiles.
    pub fn stride(&self) -> f32 {
        self.tile_width + self.item_spacing
    }

    /// Total width of a row holding `count` tiles.
    pub fn content_width(&self, count: usize) -> f32 {
        if count == 0 {
            return 0.0;
        }
        count as f32 * self.stride() - self.item_spacing
    }
}

impl Default for CategoryLayout {
    fn default() -> Self {
        Self::from_metrics(&ItemMetrics::default())
    }
}
