//! Payloads describing a user action on a tile.

use crate::item::{Item, ItemLinks};

/// Structured description of an activated item, handed to whoever drives
/// navigation outside the carousel.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ActionPayload {
    /// Action name, e.g. `"OK"` or `"INFO"`; empty for plain selection.
    pub action: String,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Asset type of the item.
    pub id: String,
    /// The item's thumbnail URI, empty if it has none.
    pub thumbnail_url: String,
    pub links: ItemLinks,
}

impl ActionPayload {
    /// Build the payload for `action` on `item`.
    pub fn for_item(action: &str, item: &Item) -> Self {
        Self {
            action: action.to_string(),
            title: item.title.clone(),
            description: item.description.clone(),
            category: item.category.clone(),
            id: item.asset_type.clone(),
            thumbnail_url: item.thumbnail.clone(),
            links: item.links.clone(),
        }
    }

    /// Href the consumer should follow for this action, if the item has one.
    pub fn href(&self) -> Option<&str> {
        self.links.href(&self.action)
    }
}
