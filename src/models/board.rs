//! Board model for the SDK

use super::tile::Tile;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named grid of tiles as stored by the application.
///
/// `tiles` may be sparse: a `null` slot is kept as `None` and skipped when
/// laying out export grids.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Localization reference for the display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_key: Option<String>,
    #[serde(default)]
    pub tiles: Vec<Option<Tile>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Board {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_name_key(mut self, key: impl Into<String>) -> Self {
        self.name_key = Some(key.into());
        self
    }

    pub fn with_tile(mut self, tile: Tile) -> Self {
        self.tiles.push(Some(tile));
        self
    }

    pub fn with_tiles(mut self, tiles: impl IntoIterator<Item = Tile>) -> Self {
        self.tiles.extend(tiles.into_iter().map(Some));
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Tiles present on the board, skipping empty slots
    pub fn present_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().flatten()
    }

    pub fn has_tiles(&self) -> bool {
        self.present_tiles().next().is_some()
    }

    /// Look up a property by its stored (camelCase) key
    pub fn property(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.extra.get(key) {
            return Some(value.clone());
        }
        match key {
            "id" => Some(Value::String(self.id.clone())),
            "name" => Some(Value::String(self.name.clone())),
            "nameKey" => self.name_key.clone().map(Value::String),
            _ => None,
        }
    }
}
