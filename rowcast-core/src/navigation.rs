//! Directional navigation planning.
//!
//! The engine is pure: given the current selection and geometry it decides
//! where focus goes and which offsets the scroll animations should head
//! for. Applying the plan (selection update, tweens, preloading, eviction)
//! is the view's job.

use crate::constants::{layout as layout_consts, motion};
use crate::content::ContentIndex;
use crate::layout::CategoryLayoutModel;
use crate::scroll::{ScrollState, Viewport};

/// Remote-control direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Focused item. `None` only while there is no content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<usize>,
}

impl Selection {
    pub fn new(current: Option<usize>) -> Self {
        Self { current }
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Category of the focused item.
    pub fn category<'a>(&self, content: &'a ContentIndex) -> Option<&'a str> {
        self.current.and_then(|index| content.category_of(index))
    }

    /// Focus `index` if it exists. Returns whether the selection changed.
    pub fn set(&mut self, index: usize, content: &ContentIndex) -> bool {
        if content.item(index).is_none() || self.current == Some(index) {
            return false;
        }
        self.current = Some(index);
        true
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

/// Geometry a plan is computed against.
#[derive(Debug, Clone, Copy)]
pub struct NavGeometry<'a> {
    pub content: &'a ContentIndex,
    pub layout: &'a CategoryLayoutModel,
    pub scroll: &'a ScrollState,
    pub viewport: Viewport,
}

/// Vertical destination of a row change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalTarget {
    pub offset: f32,
    /// The destination is the last row, which anchors to its bottom edge.
    pub last_row: bool,
}

/// A planned move.
#[derive(Debug, Clone, PartialEq)]
pub struct NavPlan {
    pub direction: Direction,
    pub from: usize,
    pub target: usize,
    pub category: String,
    /// Horizontal offset the destination row should scroll to.
    pub horizontal: f32,
    /// Present for row changes.
    pub vertical: Option<VerticalTarget>,
    /// Destination row and its neighbors, for preloading.
    pub preload_rows: Vec<String>,
}

/// Result of a directional input.
#[derive(Debug, Clone, PartialEq)]
pub enum NavOutcome {
    Moved(NavPlan),
    /// Left edge of a row: the input belongs to an outer context.
    Propagate,
    /// Boundary or empty content; nothing changes.
    Stay,
}

/// Plans moves and scroll targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationEngine;

impl NavigationEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(
        &self,
        direction: Direction,
        selection: &Selection,
        geo: &NavGeometry<'_>,
    ) -> NavOutcome {
        let Some(current) = selection.current() else {
            return NavOutcome::Stay;
        };
        let (Some(category), Some(position)) = (
            geo.content.category_of(current),
            geo.content.position_in_category(current),
        ) else {
            return NavOutcome::Stay;
        };
        let count = geo.content.count_in(category);

        let (target_category, target_position) = match direction {
            Direction::Left => {
                if position == 0 {
                    return NavOutcome::Propagate;
                }
                (category, position - 1)
            }
            Direction::Right => {
                if position + 1 >= count {
                    return NavOutcome::Stay;
                }
                (category, position + 1)
            }
            Direction::Up | Direction::Down => {
                let Some(row) = geo.content.row_position(category) else {
                    return NavOutcome::Stay;
                };
                let next_row = match direction {
                    Direction::Up => row.checked_sub(1),
                    _ => Some(row + 1),
                };
                let Some(next) = next_row.and_then(|r| geo.content.row_at(r)) else {
                    return NavOutcome::Stay;
                };
                // Same relative position, else the first item.
                let target_position = if position < geo.content.count_in(next) {
                    position
                } else {
                    0
                };
                (next, target_position)
            }
        };

        let Some(target) = geo.content.index_at(target_category, target_position)
        else {
            return NavOutcome::Stay;
        };

        let horizontal =
            horizontal_target(geo, target_category, target_position);
        let vertical = match direction {
            Direction::Up | Direction::Down => {
                Some(vertical_target(geo, target_category))
            }
            _ => None,
        };

        NavOutcome::Moved(NavPlan {
            direction,
            from: current,
            target,
            category: target_category.to_string(),
            horizontal,
            vertical,
            preload_rows: neighbor_rows(geo.content, target_category),
        })
    }
}

/// Horizontal offset that brings the tile at `position` into view.
///
/// The tile is centered, except that the last tile of a row wider than the
/// viewport pins the row to its maximum offset so no dead space opens up
/// past the end.
pub fn horizontal_target(
    geo: &NavGeometry<'_>,
    category: &str,
    position: usize,
) -> f32 {
    let layout = geo.layout.layout_for(category);
    let max = geo
        .layout
        .max_horizontal_scroll(geo.content, category, geo.viewport.width);
    let count = geo.content.count_in(category);
    let row_width = geo.layout.row_width(geo.content, category);

    if position + 1 == count && row_width > geo.viewport.width {
        return max;
    }
    // Measured from the row origin, ignoring the left margin.
    let centered =
        position as f32 * layout.stride() - (geo.viewport.width - layout.tile_width) / 2.0;
    centered.clamp(0.0, max)
}

/// Vertical offset for focusing `category`.
///
/// Rows are centered. The last row instead anchors its bottom edge (plus
/// room for the focus scale) near the bottom of the viewport, since
/// centering it would ask for space past the end of the content.
pub fn vertical_target(geo: &NavGeometry<'_>, category: &str) -> VerticalTarget {
    let last_row = geo.content.rows().last().is_some_and(|r| r == category);
    let max = geo
        .layout
        .max_vertical_scroll(geo.content, geo.viewport.height);
    let Some(row) = geo.layout.row(geo.content, category) else {
        return VerticalTarget {
            offset: 0.0,
            last_row,
        };
    };

    let desired = if last_row {
        let bottom = row.tile_top
            + row.layout.tile_height * (1.0 + layout_consts::LAST_ROW_FOCUS_PADDING);
        bottom - geo.viewport.height * motion::LAST_ROW_ANCHOR
    } else {
        row.tile_top - (geo.viewport.height - row.layout.row_height) / 2.0
    };

    VerticalTarget {
        offset: desired.clamp(0.0, max),
        last_row,
    }
}

/// Vertical offset that fully reveals the focused last row, or `None` if it
/// already fits.
///
/// A bottom overflow wins: the padded bottom is brought up to the anchor
/// line. Otherwise a row clipped at the top is scrolled down to its top.
pub fn last_row_correction(
    geo: &NavGeometry<'_>,
    selection: &Selection,
) -> Option<f32> {
    let category = selection.category(geo.content)?;
    if geo.content.rows().last().map(String::as_str) != Some(category) {
        return None;
    }
    let row = geo.layout.row(geo.content, category)?;
    let current = geo.scroll.vertical();
    let padded_bottom = row.tile_top
        + row.layout.tile_height * (1.0 + motion::CORRECTIVE_FOCUS_PADDING)
        - current;
    let limit = geo.viewport.height * motion::CORRECTIVE_ANCHOR;

    let desired = if padded_bottom > limit {
        current + (padded_bottom - limit)
    } else if row.tile_top < current {
        row.tile_top
    } else {
        return None;
    };
    let max = geo
        .layout
        .max_vertical_scroll(geo.content, geo.viewport.height);
    let desired = desired.clamp(0.0, max);
    ((desired - current).abs() > 0.5).then_some(desired)
}

/// `category` followed by the rows directly above and below it.
pub fn neighbor_rows(content: &ContentIndex, category: &str) -> Vec<String> {
    let mut rows = vec![category.to_string()];
    if let Some(position) = content.row_position(category) {
        if let Some(above) = position.checked_sub(1).and_then(|p| content.row_at(p)) {
            rows.push(above.to_string());
        }
        if let Some(below) = content.row_at(position + 1) {
            rows.push(below.to_string());
        }
    }
    rows
}
