//! Viewport size and clamped scroll offsets.

use std::collections::HashMap;

/// Size of the widget in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A viewport with no area never shows anything.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Global vertical offset plus one horizontal offset per category.
///
/// Every setter clamps into `[0, max]`; out-of-range values are never
/// stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollState {
    vertical: f32,
    horizontal: HashMap<String, f32>,
}

fn clamp_offset(value: f32, max: f32) -> f32 {
    let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertical(&self) -> f32 {
        self.vertical
    }

    /// Horizontal offset of `category`; unscrolled rows read as zero.
    pub fn horizontal(&self, category: &str) -> f32 {
        self.horizontal.get(category).copied().unwrap_or(0.0)
    }

    /// Set the vertical offset, clamped to `[0, max]`. Returns the stored
    /// value.
    pub fn set_vertical(&mut self, value: f32, max: f32) -> f32 {
        self.vertical = clamp_offset(value, max);
        self.vertical
    }

    /// Set `category`'s horizontal offset, clamped to `[0, max]`. Returns
    /// the stored value.
    pub fn set_horizontal(&mut self, category: &str, value: f32, max: f32) -> f32 {
        let clamped = clamp_offset(value, max);
        if clamped == 0.0 {
            self.horizontal.remove(category);
        } else {
            self.horizontal.insert(category.to_string(), clamped);
        }
        clamped
    }

    /// Re-apply bounds after a viewport or content change shrank them.
    pub fn reclamp<F>(&mut self, max_vertical: f32, max_horizontal: F)
    where
        F: Fn(&str) -> f32,
    {
        self.vertical = clamp_offset(self.vertical, max_vertical);
        self.horizontal.retain(|category, offset| {
            *offset = clamp_offset(*offset, max_horizontal(category));
            *offset > 0.0
        });
    }

    /// Back to the origin, used on content reload.
    pub fn reset(&mut self) {
        self.vertical = 0.0;
        self.horizontal.clear();
    }
}
