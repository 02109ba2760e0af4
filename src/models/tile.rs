//! Tile model for the SDK

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single selectable cell on a board.
///
/// Field names follow the application's stored (camelCase) representation so
/// that a native export round-trips records verbatim. Keys the SDK does not
/// model are kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_key: Option<String>,
    /// Inline `data:` URI or a remote/local path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocalization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Id of the board this tile navigates to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_board: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_label_key(mut self, key: impl Into<String>) -> Self {
        self.label_key = Some(key.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_load_board(mut self, board_id: impl Into<String>) -> Self {
        self.load_board = Some(board_id.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Image reference, if present and non-empty
    pub fn image_ref(&self) -> Option<&str> {
        self.image.as_deref().filter(|image| !image.is_empty())
    }

    /// Look up a property by its stored (camelCase) key, covering both
    /// modelled fields and unmodelled extras.
    pub fn property(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.extra.get(key) {
            return Some(value.clone());
        }
        let text = match key {
            "id" => Some(&self.id),
            "label" => self.label.as_ref(),
            "labelKey" => self.label_key.as_ref(),
            "image" => self.image.as_ref(),
            "vocalization" => self.vocalization.as_ref(),
            "action" => self.action.as_ref(),
            "backgroundColor" => self.background_color.as_ref(),
            "borderColor" => self.border_color.as_ref(),
            "loadBoard" => self.load_board.as_ref(),
            _ => None,
        };
        text.map(|t| Value::String(t.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_with_extras() {
        let json = r#"{
            "id": "t1",
            "labelKey": "cboard.symbol.yes",
            "backgroundColor": "rgb(255, 241, 118)",
            "loadBoard": "b2",
            "linkedBoard": true
        }"#;
        let tile: Tile = serde_json::from_str(json).unwrap();
        assert_eq!(tile.label_key.as_deref(), Some("cboard.symbol.yes"));
        assert_eq!(tile.load_board.as_deref(), Some("b2"));
        assert_eq!(tile.extra.get("linkedBoard"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_property_lookup() {
        let tile = Tile::new("t1")
            .with_label_key("key")
            .with_property("hidden", Value::Bool(false));
        assert_eq!(tile.property("labelKey"), Some(Value::String("key".into())));
        assert_eq!(tile.property("hidden"), Some(Value::Bool(false)));
        assert_eq!(tile.property("nameKey"), None);
    }

    #[test]
    fn test_empty_image_is_absent() {
        let tile = Tile::new("t1").with_image("");
        assert!(tile.image_ref().is_none());
    }
}
