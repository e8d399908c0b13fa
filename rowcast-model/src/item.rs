//! Displayable tiles and their action links.

use std::collections::BTreeMap;

/// Action name → href table attached to an item.
///
/// Action names are stored upper-cased so lookups from key handlers
/// (`"OK"`, `"INFO"`) do not depend on how the content source spelled them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemLinks(BTreeMap<String, String>);

impl ItemLinks {
    /// Create an empty link table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `href` for `action`, replacing any previous binding.
    pub fn insert(&mut self, action: &str, href: impl Into<String>) {
        self.0.insert(action.to_uppercase(), href.into());
    }

    /// Href bound to `action`, if any.
    pub fn href(&self, action: &str) -> Option<&str> {
        self.0.get(&action.to_uppercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(action, href)` pairs in action order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ItemLinks {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut links = ItemLinks::new();
        for (action, href) in iter {
            links.insert(action.as_ref(), href);
        }
        links
    }
}

/// One displayable tile.
///
/// `index` is the position in content-load order. Items are never reordered
/// in place; a reload replaces the whole list.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub index: usize,
    /// Category (row) this item is displayed in.
    pub category: String,
    pub title: String,
    /// Local path or remote URL of the poster artwork.
    pub image_source: String,
    /// Thumbnail URI reported to consumers, which may differ from the
    /// artwork actually drawn.
    pub thumbnail: String,
    pub description: String,
    pub id: String,
    pub asset_type: String,
    pub links: ItemLinks,
}

impl Item {
    /// Minimal item with only the fields the layout needs.
    pub fn new(
        index: usize,
        category: impl Into<String>,
        title: impl Into<String>,
        image_source: impl Into<String>,
    ) -> Self {
        Self {
            index,
            category: category.into(),
            title: title.into(),
            image_source: image_source.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_asset_type(mut self, asset_type: impl Into<String>) -> Self {
        self.asset_type = asset_type.into();
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = thumbnail.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_links(mut self, links: ItemLinks) -> Self {
        self.links = links;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_lookup_ignores_action_case() {
        let mut links = ItemLinks::new();
        links.insert("ok", "app://play/42");

        assert_eq!(links.href("OK"), Some("app://play/42"));
        assert_eq!(links.href("Ok"), Some("app://play/42"));
        assert_eq!(links.href("INFO"), None);
    }

    #[test]
    fn links_collect_from_pairs_and_keep_last_binding() {
        let links: ItemLinks =
            [("info", "a"), ("OK", "b"), ("Info", "c")].into_iter().collect();

        assert_eq!(links.len(), 2);
        assert_eq!(links.href("INFO"), Some("c"));
    }
}
