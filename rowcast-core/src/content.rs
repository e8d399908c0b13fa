//! Flat item list with derived category membership.

use std::collections::HashMap;

use rowcast_model::Item;

/// Ordered content with per-category lookups.
///
/// Items keep their load order as their index. Categories are displayed in
/// `row_order`; a category that appears on items but not in the explicit
/// order is appended in first-seen order so no item is ever unreachable.
#[derive(Debug, Clone, Default)]
pub struct ContentIndex {
    items: Vec<Item>,
    rows: Vec<String>,
    members: HashMap<String, Vec<usize>>,
    positions: Vec<usize>,
}

impl ContentIndex {
    /// Build an index from items and the preferred row order.
    ///
    /// Item `index` fields are rewritten to match their position; callers
    /// may pass items straight from a parser.
    pub fn new(mut items: Vec<Item>, row_order: Vec<String>) -> Self {
        let mut rows: Vec<String> = Vec::with_capacity(row_order.len());
        for name in row_order {
            if !rows.contains(&name) {
                rows.push(name);
            }
        }

        let mut members: HashMap<String, Vec<usize>> = HashMap::new();
        let mut positions = Vec::with_capacity(items.len());
        for (index, item) in items.iter_mut().enumerate() {
            item.index = index;
            let list = members.entry(item.category.clone()).or_default();
            positions.push(list.len());
            list.push(index);
            if !rows.contains(&item.category) {
                rows.push(item.category.clone());
            }
        }

        // Rows with no items take no space.
        rows.retain(|name| members.contains_key(name));

        Self {
            items,
            rows,
            members,
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Category names in display order.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn category_of(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(|item| item.category.as_str())
    }

    /// Flat indices of `category`, left to right.
    pub fn items_in(&self, category: &str) -> &[usize] {
        self.members
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn count_in(&self, category: &str) -> usize {
        self.items_in(category).len()
    }

    /// Position of `index` within its own category.
    pub fn position_in_category(&self, index: usize) -> Option<usize> {
        self.positions.get(index).copied()
    }

    /// Flat index of the item at `position` in `category`.
    pub fn index_at(&self, category: &str, position: usize) -> Option<usize> {
        self.items_in(category).get(position).copied()
    }

    /// Display-order position of `category`.
    pub fn row_position(&self, category: &str) -> Option<usize> {
        self.rows.iter().position(|name| name == category)
    }

    pub fn row_at(&self, position: usize) -> Option<&str> {
        self.rows.get(position).map(String::as_str)
    }

    /// First item of the first row, used as the initial selection.
    pub fn first_index(&self) -> Option<usize> {
        self.rows
            .first()
            .and_then(|row| self.items_in(row).first().copied())
    }
}
