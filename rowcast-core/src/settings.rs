//! Tunable carousel settings.
//!
//! `CarouselTuning` is deserialized from the tuning file (see the
//! `rowcast-config` crate) and handed to the view at construction. Every
//! field has a serde default so partial files are valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    cache, fetch, layout, motion, navigation, visibility,
};

/// Runtime knobs for visibility, caching, motion and fetching.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CarouselTuning {
    /// Rows worth of textures the cache is sized for. The cleanup threshold
    /// is this times `cleanup_multiplier`.
    pub visible_row_budget: usize,
    /// Textures budgeted per row.
    pub cleanup_multiplier: usize,
    /// Vertical visibility buffer as a fraction of viewport height.
    pub buffer_factor: f32,
    /// Buffer used for eager loading after navigation.
    pub eager_buffer_factor: f32,
    /// Horizontal visibility buffer as a fraction of viewport width.
    pub horizontal_buffer_fraction: f32,
    /// Distance from the left edge to the first tile of each row.
    pub left_margin: f32,
    /// Hard abort for a remote image fetch (ms).
    pub fetch_timeout_ms: u64,
    /// Duration of horizontal and upward scroll animations (ms).
    pub scroll_duration_ms: u64,
    /// Duration of downward scroll animations (ms).
    pub vertical_down_duration_ms: u64,
    /// Duration of the last-row corrective nudge (ms).
    pub corrective_duration_ms: u64,
    /// Items preloaded either side of the focused position.
    pub preload_radius: usize,
    /// Scale applied to the focused tile.
    pub focus_scale: f32,
    /// Decoded local images memoized by path.
    pub local_memo_capacity: usize,
}

impl Default for CarouselTuning {
    fn default() -> Self {
        Self {
            visible_row_budget: cache::VISIBLE_ROW_BUDGET,
            cleanup_multiplier: cache::CLEANUP_MULTIPLIER,
            buffer_factor: visibility::BUFFER_FACTOR,
            eager_buffer_factor: visibility::EAGER_BUFFER_FACTOR,
            horizontal_buffer_fraction: visibility::HORIZONTAL_BUFFER_FRACTION,
            left_margin: layout::LEFT_MARGIN,
            fetch_timeout_ms: fetch::TIMEOUT_MS,
            scroll_duration_ms: motion::SCROLL_DURATION_MS,
            vertical_down_duration_ms: motion::DOWN_DURATION_MS,
            corrective_duration_ms: motion::CORRECTIVE_DURATION_MS,
            preload_radius: navigation::PRELOAD_RADIUS,
            focus_scale: layout::FOCUS_SCALE,
            local_memo_capacity: cache::LOCAL_MEMO_CAPACITY,
        }
    }
}

impl CarouselTuning {
    /// Cache size above which an eviction pass runs.
    pub fn cleanup_threshold(&self) -> usize {
        self.visible_row_budget
            .saturating_mul(self.cleanup_multiplier)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn scroll_duration(&self) -> Duration {
        Duration::from_millis(self.scroll_duration_ms)
    }

    pub fn vertical_down_duration(&self) -> Duration {
        Duration::from_millis(self.vertical_down_duration_ms)
    }

    pub fn corrective_duration(&self) -> Duration {
        Duration::from_millis(self.corrective_duration_ms)
    }

    /// Clamp values that would break layout math back into range.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.buffer_factor.is_finite() || self.buffer_factor < 0.0 {
            self.buffer_factor = defaults.buffer_factor;
        }
        if !self.eager_buffer_factor.is_finite()
            || self.eager_buffer_factor < self.buffer_factor
        {
            self.eager_buffer_factor =
                self.buffer_factor.max(defaults.eager_buffer_factor);
        }
        if !self.horizontal_buffer_fraction.is_finite()
            || self.horizontal_buffer_fraction < 0.0
        {
            self.horizontal_buffer_fraction =
                defaults.horizontal_buffer_fraction;
        }
        if !self.left_margin.is_finite() || self.left_margin < 0.0 {
            self.left_margin = defaults.left_margin;
        }
        if !self.focus_scale.is_finite() || self.focus_scale < 1.0 {
            self.focus_scale = 1.0;
        }
        if self.visible_row_budget == 0 {
            self.visible_row_budget = 1;
        }
        self
    }
}
