//! Carousel constants
//!
//! Built-in defaults for visibility windows, cache budget, motion and image
//! fetching. Runtime overrides live in [`crate::settings::CarouselTuning`];
//! these values are what it falls back to.

/// Geometry of the row stack.
pub mod layout {
    /// Distance from the widget's left edge to the first tile of every row.
    pub const LEFT_MARGIN: f32 = 60.0;
    /// Height of the title band drawn above each row.
    pub const TITLE_HEIGHT: f32 = 25.0;
    /// Vertical gap between the bottom of one row and the next title.
    pub const ROW_SPACING: f32 = 10.0;
    /// Scale applied to the focused tile, around its center.
    pub const FOCUS_SCALE: f32 = 1.1;
    /// Extra room below the last row so the focused tile can grow, as a
    /// fraction of its tile height.
    pub const LAST_ROW_FOCUS_PADDING: f32 = 0.2;
}

/// Visible window buffers.
pub mod visibility {
    /// Fraction of viewport height added above and below for row culling.
    pub const BUFFER_FACTOR: f32 = 0.5;
    /// Larger buffer used when eagerly preloading around navigation.
    pub const EAGER_BUFFER_FACTOR: f32 = 0.8;
    /// Fraction of viewport width added left and right for tile culling.
    pub const HORIZONTAL_BUFFER_FRACTION: f32 = 0.5;
}

/// Texture cache budget.
pub mod cache {
    /// Rows worth of textures the cache is sized for.
    pub const VISIBLE_ROW_BUDGET: usize = 6;
    /// Textures per budgeted row.
    pub const CLEANUP_MULTIPLIER: usize = 10;
    /// Tile widths outside the viewport a texture may sit before the second
    /// eviction pass drops it.
    pub const OFFSCREEN_TILE_SLACK: f32 = 2.0;
    /// Decoded local images kept for reuse across cache evictions.
    pub const LOCAL_MEMO_CAPACITY: usize = 100;
}

/// Scroll animation timing.
pub mod motion {
    /// Horizontal and upward navigation duration (ms).
    pub const SCROLL_DURATION_MS: u64 = 300;
    /// Downward navigation duration (ms).
    pub const DOWN_DURATION_MS: u64 = 350;
    /// Last-row corrective nudge duration (ms).
    pub const CORRECTIVE_DURATION_MS: u64 = 200;
    /// Share of the viewport the last row's bottom should land at when
    /// navigating down into it.
    pub const LAST_ROW_ANCHOR: f32 = 0.9;
    /// Share of the viewport the focused last row must fit inside before a
    /// corrective nudge is skipped.
    pub const CORRECTIVE_ANCHOR: f32 = 0.95;
    /// Focus padding used by the corrective check, as a fraction of tile
    /// height.
    pub const CORRECTIVE_FOCUS_PADDING: f32 = 0.25;
}

/// Navigation preloading.
pub mod navigation {
    /// Items loaded on each side of the focused position in the destination
    /// row and its neighbors.
    pub const PRELOAD_RADIUS: usize = 5;
}

/// Remote image fetching.
pub mod fetch {
    /// Hard abort for a single fetch (ms).
    pub const TIMEOUT_MS: u64 = 30_000;
    /// Redirect hops followed before giving up.
    pub const MAX_REDIRECTS: usize = 10;
}

/// Placeholder artwork.
pub mod placeholder {
    /// Fill color of synthesized placeholder tiles.
    pub const FILL_RGBA: [u8; 4] = [64, 64, 64, 255];
    /// Border color drawn around placeholder tiles.
    pub const BORDER_RGBA: [u8; 4] = [96, 96, 96, 255];
}
