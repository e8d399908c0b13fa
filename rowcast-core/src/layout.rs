//! Category layout model and the row stack geometry derived from it.
//!
//! All positions here are in content coordinates: `y = 0` is the top of the
//! first title band and `x = 0` is the widget's left edge before any
//! horizontal scroll is applied.

use std::collections::HashMap;

use rowcast_model::{CategoryLayout, ItemMetrics};

use crate::constants::layout as defaults;
use crate::content::ContentIndex;

/// Bottom padding below the last row, as a fraction of its tile height, so
/// the focused tile's scale effect is never clipped.
const LAST_ROW_PADDING_FRACTION: f32 = 0.5;

/// Vertical placement of one row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGeometry {
    pub category: String,
    /// Display-order position of the row.
    pub position: usize,
    /// Top of the title band.
    pub title_top: f32,
    /// Top of the tile band, directly below the title.
    pub tile_top: f32,
    pub layout: CategoryLayout,
}

impl RowGeometry {
    /// Bottom of the tile band (`tile_top + row_height`).
    pub fn row_bottom(&self) -> f32 {
        self.tile_top + self.layout.row_height
    }
}

/// Maps category names to tile geometry, with deterministic defaults.
#[derive(Debug, Clone)]
pub struct CategoryLayoutModel {
    layouts: HashMap<String, CategoryLayout>,
    metrics: ItemMetrics,
    title_height: f32,
    row_spacing: f32,
    left_margin: f32,
}

impl Default for CategoryLayoutModel {
    fn default() -> Self {
        Self::new(ItemMetrics::default())
    }
}

impl CategoryLayoutModel {
    pub fn new(metrics: ItemMetrics) -> Self {
        Self {
            layouts: HashMap::new(),
            metrics,
            title_height: defaults::TITLE_HEIGHT,
            row_spacing: defaults::ROW_SPACING,
            left_margin: defaults::LEFT_MARGIN,
        }
    }

    pub fn with_title_height(mut self, title_height: f32) -> Self {
        self.title_height = title_height.max(0.0);
        self
    }

    pub fn with_row_spacing(mut self, row_spacing: f32) -> Self {
        self.row_spacing = row_spacing.max(0.0);
        self
    }

    pub fn with_left_margin(mut self, left_margin: f32) -> Self {
        self.left_margin = left_margin.max(0.0);
        self
    }

    /// Register an explicit layout for `category`.
    pub fn insert(&mut self, category: impl Into<String>, layout: CategoryLayout) {
        self.layouts.insert(category.into(), layout);
    }

    pub fn metrics(&self) -> &ItemMetrics {
        &self.metrics
    }

    pub fn title_height(&self) -> f32 {
        self.title_height
    }

    pub fn row_spacing(&self) -> f32 {
        self.row_spacing
    }

    pub fn left_margin(&self) -> f32 {
        self.left_margin
    }

    pub fn has_explicit(&self, category: &str) -> bool {
        self.layouts.contains_key(category)
    }

    /// Layout for `category`, falling back to the metric-derived default.
    pub fn layout_for(&self, category: &str) -> CategoryLayout {
        self.layouts
            .get(category)
            .copied()
            .unwrap_or_else(|| CategoryLayout::from_metrics(&self.metrics))
    }

    /// Vertical placement of every row in display order.
    pub fn rows(&self, content: &ContentIndex) -> Vec<RowGeometry> {
        let mut cursor = 0.0;
        let mut out = Vec::with_capacity(content.rows().len());
        for (position, category) in content.rows().iter().enumerate() {
            let layout = self.layout_for(category);
            let tile_top = cursor + self.title_height;
            out.push(RowGeometry {
                category: category.clone(),
                position,
                title_top: cursor,
                tile_top,
                layout,
            });
            cursor = tile_top + layout.row_height + self.row_spacing;
        }
        out
    }

    /// Geometry of a single row.
    pub fn row(
        &self,
        content: &ContentIndex,
        category: &str,
    ) -> Option<RowGeometry> {
        self.rows(content)
            .into_iter()
            .find(|row| row.category == category)
    }

    /// Total scrollable height of the row stack.
    pub fn content_height(&self, content: &ContentIndex) -> f32 {
        let rows = self.rows(content);
        let Some(last) = rows.last() else {
            return 0.0;
        };
        last.row_bottom()
            + last.layout.tile_height * LAST_ROW_PADDING_FRACTION
            + self.row_spacing
    }

    pub fn max_vertical_scroll(
        &self,
        content: &ContentIndex,
        viewport_height: f32,
    ) -> f32 {
        (self.content_height(content) - viewport_height).max(0.0)
    }

    /// Width of a row including the margin on both sides.
    pub fn row_width(&self, content: &ContentIndex, category: &str) -> f32 {
        let count = content.count_in(category);
        if count == 0 {
            return 0.0;
        }
        self.layout_for(category).content_width(count)
            + self.left_margin * 2.0
    }

    pub fn max_horizontal_scroll(
        &self,
        content: &ContentIndex,
        category: &str,
        viewport_width: f32,
    ) -> f32 {
        (self.row_width(content, category) - viewport_width).max(0.0)
    }

    /// Left edge of the tile at `position` before horizontal scroll.
    pub fn tile_x(&self, category: &str, position: usize) -> f32 {
        self.left_margin + position as f32 * self.layout_for(category).stride()
    }
}
