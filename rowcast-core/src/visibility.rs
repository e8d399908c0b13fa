//! Visible window computation.
//!
//! A pure function of content, layout, scroll offsets and viewport: the same
//! inputs always produce the same sets, so it can be recomputed freely on
//! every geometry or scroll change.

use std::collections::BTreeSet;

use crate::constants::visibility::HORIZONTAL_BUFFER_FRACTION;
use crate::content::ContentIndex;
use crate::layout::CategoryLayoutModel;
use crate::scroll::{ScrollState, Viewport};

/// Item indices and categories on or near screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleSet {
    pub indices: BTreeSet<usize>,
    pub categories: BTreeSet<String>,
}

impl VisibleSet {
    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn contains_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() && self.categories.is_empty()
    }
}

/// Computes [`VisibleSet`]s with a fixed horizontal buffer policy.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityCalculator {
    horizontal_buffer_fraction: f32,
}

impl Default for VisibilityCalculator {
    fn default() -> Self {
        Self::new(HORIZONTAL_BUFFER_FRACTION)
    }
}

impl VisibilityCalculator {
    pub fn new(horizontal_buffer_fraction: f32) -> Self {
        Self {
            horizontal_buffer_fraction: horizontal_buffer_fraction.max(0.0),
        }
    }

    /// Compute the visible window.
    ///
    /// `buffer_factor` widens the vertical row window by that fraction of
    /// the viewport height on both sides. Individual tiles additionally
    /// need to be within one tile height vertically and within the
    /// horizontal buffer of the viewport.
    pub fn compute(
        &self,
        content: &ContentIndex,
        layout: &CategoryLayoutModel,
        scroll: &ScrollState,
        viewport: Viewport,
        buffer_factor: f32,
    ) -> VisibleSet {
        let mut visible = VisibleSet::default();
        if viewport.is_empty() || content.is_empty() {
            return visible;
        }

        let buffer = viewport.height * buffer_factor.max(0.0);
        let window_top = -buffer;
        let window_bottom = viewport.height + buffer;
        let h_buffer = viewport.width * self.horizontal_buffer_fraction;

        for row in layout.rows(content) {
            let row_top = row.tile_top - scroll.vertical();
            let row_bottom = row_top + row.layout.row_height;
            if row_bottom < window_top || row_top > window_bottom {
                continue;
            }
            visible.categories.insert(row.category.clone());

            let tile_w = row.layout.tile_width;
            let tile_h = row.layout.tile_height;
            let band_hit = row_top + tile_h >= -tile_h
                && row_top <= viewport.height + tile_h;
            if !band_hit {
                continue;
            }

            let left = -tile_w - h_buffer;
            let right = viewport.width + tile_w + h_buffer;
            let mut x = layout.left_margin() - scroll.horizontal(&row.category);
            for &index in content.items_in(&row.category) {
                if x > right {
                    break;
                }
                if x + tile_w >= left {
                    visible.indices.insert(index);
                }
                x += row.layout.stride();
            }
        }

        visible
    }
}
