//! Menu content: rows of items from the `menuItems` document.

use rowcast_core::ContentIndex;
use rowcast_model::{Item, ItemLinks};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ContentError;

/// Asset type of the "view all" tiles the menu appends to rows.
const VIEW_ALL: &str = "viewAll";
const PLACEHOLDER_ROW: &str = "Test Items";

/// Items and row order ready to become a [`ContentIndex`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub items: Vec<Item>,
    pub rows: Vec<String>,
}

impl Catalog {
    /// Small built-in content so the carousel stays usable when the menu
    /// cannot be loaded.
    pub fn placeholder() -> Self {
        let items = (0..5)
            .map(|i| {
                Item::new(
                    i,
                    PLACEHOLDER_ROW,
                    format!("Test Item {}", i + 1),
                    bundled_image(i),
                )
                .with_id(i.to_string())
            })
            .collect();
        Self {
            items,
            rows: vec![PLACEHOLDER_ROW.to_string()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_content(self) -> ContentIndex {
        ContentIndex::new(self.items, self.rows)
    }
}

/// Bundled artwork cycled through for items without an image.
fn bundled_image(n: usize) -> String {
    format!("images/img{}.jpg", n % 5 + 1)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MenuDocument {
    menu_items: Option<MenuItems>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MenuItems {
    items: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MenuRow {
    title: String,
    items: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MenuEntry {
    id: Option<Value>,
    title: String,
    asset_type: String,
    short_synopsis: String,
    mood_image_uri: String,
    thumbnail_uri: String,
    links: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MenuLink {
    href: String,
    events: Vec<String>,
    event: Option<String>,
}

impl MenuEntry {
    fn links(&self) -> ItemLinks {
        let mut links = ItemLinks::new();
        for value in &self.links {
            let Ok(link) = MenuLink::deserialize(value) else {
                continue;
            };
            if !link.events.is_empty() {
                for event in &link.events {
                    links.insert(event, link.href.clone());
                }
            } else if let Some(event) = &link.event {
                links.insert(event, link.href.clone());
            }
        }
        links
    }

    fn into_item(self, index: usize, category: &str) -> Item {
        let links = self.links();
        let source = [&self.mood_image_uri, &self.thumbnail_uri]
            .into_iter()
            .find(|uri| !uri.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| bundled_image(index));
        let id = match self.id {
            Some(Value::String(id)) => id,
            Some(Value::Number(id)) => id.to_string(),
            _ => self.asset_type.clone(),
        };
        Item::new(index, category, self.title, source)
            .with_thumbnail(self.thumbnail_uri)
            .with_description(self.short_synopsis)
            .with_asset_type(self.asset_type)
            .with_id(id)
            .with_links(links)
    }
}

/// Parse a menu document into rows and items.
///
/// Each entry of `menuItems.items` is a row titled by its `title`; its
/// `items` become tiles in that row. `viewAll` tiles and malformed entries
/// are skipped, as are rows left with no items.
pub fn parse_menu(raw: &str) -> Result<Catalog, ContentError> {
    let document: MenuDocument = serde_json::from_str(raw)?;
    let menu = document
        .menu_items
        .ok_or(ContentError::MissingSection("menuItems"))?;

    let mut catalog = Catalog::default();
    for row_value in menu.items {
        let Ok(row) = MenuRow::deserialize(row_value) else {
            tracing::debug!("skipping malformed menu row");
            continue;
        };
        let before = catalog.items.len();
        for value in row.items {
            if !value.is_object() {
                continue;
            }
            let Ok(entry) = MenuEntry::deserialize(value) else {
                tracing::debug!("skipping malformed item in row {}", row.title);
                continue;
            };
            if entry.asset_type == VIEW_ALL {
                continue;
            }
            let index = catalog.items.len();
            catalog.items.push(entry.into_item(index, &row.title));
        }
        if catalog.items.len() > before && !catalog.rows.contains(&row.title) {
            catalog.rows.push(row.title);
        }
    }

    if catalog.is_empty() {
        return Err(ContentError::NoItems);
    }
    Ok(catalog)
}
