//! Observable outputs and key input.

use rowcast_model::ActionPayload;
use serde::Serialize;

/// Events the carousel emits for whoever embeds it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CarouselEvent {
    /// Focus moved to `index`. The payload's action is empty.
    #[serde(rename_all = "camelCase")]
    SelectionChanged { index: usize, payload: ActionPayload },
    /// The user confirmed or asked for info on the focused item.
    #[serde(rename_all = "camelCase")]
    ActionActivated { index: usize, payload: ActionPayload },
    /// Content was (re)loaded.
    #[serde(rename_all = "camelCase")]
    ContentChanged { rows: Vec<String>, item_count: usize },
}

/// Remote-control keys the carousel understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarouselKey {
    Left,
    Right,
    Up,
    Down,
    /// OK / Enter.
    Confirm,
    Info,
}

impl CarouselKey {
    /// Action name reported for activation keys.
    pub fn action(&self) -> Option<&'static str> {
        match self {
            CarouselKey::Confirm => Some("OK"),
            CarouselKey::Info => Some("INFO"),
            _ => None,
        }
    }
}

/// Whether a key was consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    Handled,
    /// Let the key propagate to the enclosing UI.
    Ignored,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowcast_model::Item;

    #[test]
    fn events_serialize_with_type_tag() {
        let item = Item::new(2, "Movies", "Heat", "heat.jpg");
        let event = CarouselEvent::ActionActivated {
            index: 2,
            payload: ActionPayload::for_item("OK", &item),
        };

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "actionActivated");
        assert_eq!(json["payload"]["category"], "Movies");
        assert_eq!(json["payload"]["action"], "OK");
    }

    #[test]
    fn content_changed_uses_camel_case_fields() {
        let json = serde_json::to_value(CarouselEvent::ContentChanged {
            rows: vec!["A".into()],
            item_count: 3,
        })
        .unwrap();

        assert_eq!(json["itemCount"], 3);
    }
}
