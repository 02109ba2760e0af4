//! Open Board Format (OBF) mapping
//!
//! Converts stored boards into OBF documents:
//! - tiles become buttons (labels, styling, links, images, vendor extensions)
//! - tiles are laid out in a fixed-column grid
//! - images are resolved once per board and either embedded as data URIs
//!   (single-board export) or referenced by archive path (OBZ export)

use super::grid::layout_rows;
use super::image::{ImageArtifact, ImageFetcher, ImageResolver, archive_path_for, is_data_uri};
use crate::config::{ExportConfig, ObfLicense};
use crate::i18n::Translations;
use crate::models::{Board, Tile};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Format identifier written into every OBF document and manifest
pub const OBF_FORMAT: &str = "open-board-0.1";

static UPPERCASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z])").unwrap());

/// Boards of one export call, by id. Link resolution looks boards up here.
pub type BoardIndex<'a> = HashMap<&'a str, &'a Board>;

/// Index boards by id. A repeated id keeps the last board.
pub fn index_boards(boards: &[Board]) -> BoardIndex<'_> {
    boards.iter().map(|b| (b.id.as_str(), b)).collect()
}

/// Path of a board document inside an OBZ archive
pub fn board_path(board_id: &str) -> String {
    format!("boards/{}.obf", board_id)
}

/// `labelKey` -> `label_key`
pub fn to_snake_case(key: &str) -> String {
    let snake = UPPERCASE.replace_all(key, |caps: &Captures| {
        format!("_{}", caps[1].to_lowercase())
    });
    let snake = snake.as_ref();
    snake.strip_prefix('_').unwrap_or(snake).to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObfImage {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    pub content_type: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObfLoadBoard {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObfButton {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_board: Option<ObfLoadBoard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocalization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Vendor-prefixed extension keys
    #[serde(flatten)]
    pub ext: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObfGrid {
    pub rows: usize,
    pub columns: usize,
    pub order: Vec<Vec<Option<String>>>,
}

/// One OBF document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObfBoard {
    pub format: String,
    pub id: String,
    pub locale: String,
    pub name: String,
    pub url: String,
    pub license: ObfLicense,
    pub images: Vec<ObfImage>,
    pub buttons: Vec<ObfButton>,
    pub sounds: Vec<Value>,
    pub grid: ObfGrid,
    pub description_html: String,
    #[serde(flatten)]
    pub ext: Map<String, Value>,
}

/// An image that made it into a board document, with the bytes an archive
/// needs to store it
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    /// `image_id` used by buttons: `<boardId>_<reference>`
    pub id: String,
    /// The tile's image reference as stored
    pub reference: String,
    /// Path under `images/` in an archive
    pub file_key: String,
    pub artifact: ImageArtifact,
}

impl ResolvedImage {
    pub fn archive_path(&self) -> String {
        format!("images/{}", self.file_key)
    }
}

/// Output of mapping one board
#[derive(Debug, Clone)]
pub struct MappedBoard {
    pub document: ObfBoard,
    pub images: Vec<ResolvedImage>,
}

/// Images seen while mapping one board. The first reference to an id
/// decides the outcome, failures included, so nothing is fetched twice.
#[derive(Default)]
struct BoardImages {
    resolved: Vec<ResolvedImage>,
    seen: HashMap<String, Option<usize>>,
}

/// Maps stored boards and tiles to OBF records
pub struct ObfMapper<'a> {
    config: &'a ExportConfig,
    translations: &'a Translations,
    resolver: ImageResolver<'a>,
}

impl<'a> ObfMapper<'a> {
    pub fn new(
        config: &'a ExportConfig,
        translations: &'a Translations,
        fetcher: &'a dyn ImageFetcher,
    ) -> Self {
        Self {
            config,
            translations,
            resolver: ImageResolver::new(fetcher, config.platform),
        }
    }

    /// Vendor-namespaced copies of allow-listed properties
    fn extension_properties(
        &self,
        lookup: impl Fn(&str) -> Option<Value>,
        truthy_only: bool,
    ) -> Map<String, Value> {
        self.config
            .ext_properties
            .iter()
            .filter_map(|key| {
                let value = lookup(key.as_str())?;
                let keep = if truthy_only {
                    is_truthy(&value)
                } else {
                    !value.is_null()
                };
                keep.then(|| {
                    (
                        format!("{}{}", self.config.ext_prefix, to_snake_case(key)),
                        value,
                    )
                })
            })
            .collect()
    }

    /// Map a tile to a button without touching its image
    pub fn map_button(&self, tile: &Tile, boards: &BoardIndex<'_>) -> ObfButton {
        let mut button = ObfButton {
            id: tile.id.clone(),
            label: self
                .translations
                .label_for(tile.label.as_deref(), tile.label_key.as_deref()),
            action: non_empty(&tile.action),
            vocalization: non_empty(&tile.vocalization),
            border_color: non_empty(&tile.border_color),
            background_color: non_empty(&tile.background_color),
            ext: self.extension_properties(|key| tile.property(key), true),
            ..Default::default()
        };

        if let Some(target_id) = tile.load_board.as_deref() {
            match boards.get(target_id) {
                Some(target) => {
                    button.load_board = Some(ObfLoadBoard {
                        name: target
                            .name_key
                            .as_deref()
                            .map(|key| self.translations.format_message(key))
                            .unwrap_or_default(),
                        path: board_path(target_id),
                    });
                }
                None => debug!(
                    tile = %tile.id,
                    link = target_id,
                    "Dropping link to board outside export set"
                ),
            }
        }

        button
    }

    async fn attach_image(
        &self,
        board: &Board,
        tile: &Tile,
        embed: bool,
        button: &mut ObfButton,
        images: &mut BoardImages,
        documents: &mut Vec<ObfImage>,
    ) {
        let Some(reference) = tile.image_ref() else {
            return;
        };
        let image_id = format!("{}_{}", board.id, reference);

        if let Some(outcome) = images.seen.get(&image_id) {
            if outcome.is_some() {
                button.image_id = Some(image_id);
            }
            return;
        }

        match self.resolver.resolve(reference).await {
            Ok(artifact) => {
                let file_key = file_key_for(board, tile, reference, &artifact);
                let resolved = ResolvedImage {
                    id: image_id.clone(),
                    reference: reference.to_string(),
                    file_key,
                    artifact,
                };
                documents.push(ObfImage {
                    id: image_id.clone(),
                    path: (!embed).then(|| resolved.archive_path()),
                    data: embed.then(|| resolved.artifact.data_uri.clone()),
                    content_type: resolved.artifact.content_type.clone(),
                    width: self.config.image_size,
                    height: self.config.image_size,
                });
                images.seen.insert(image_id.clone(), Some(images.resolved.len()));
                images.resolved.push(resolved);
                button.image_id = Some(image_id);
            }
            Err(e) => {
                warn!(board = %board.id, tile = %tile.id, error = %e, "Exporting tile without image");
                images.seen.insert(image_id, None);
            }
        }
    }

    /// Map a board to an OBF document.
    ///
    /// Returns `None` for a board without tiles. With `embed` set, images
    /// carry inline data and no path; otherwise they carry an archive path
    /// and no data.
    pub async fn map_board(
        &self,
        board: &Board,
        boards: &BoardIndex<'_>,
        embed: bool,
    ) -> Option<MappedBoard> {
        if !board.has_tiles() {
            debug!(board = %board.id, "Board has no tiles, nothing to export");
            return None;
        }

        let mut images = BoardImages::default();
        let mut image_documents = Vec::new();
        let mut buttons = Vec::new();

        for tile in board.present_tiles() {
            let mut button = self.map_button(tile, boards);
            self.attach_image(board, tile, embed, &mut button, &mut images, &mut image_documents)
                .await;
            buttons.push(button);
        }

        let order = layout_rows(
            board.present_tiles().map(|tile| tile.id.clone()),
            self.config.columns,
        );

        let document = ObfBoard {
            format: OBF_FORMAT.to_string(),
            id: board.id.clone(),
            locale: self.translations.locale.clone(),
            name: board.name.clone(),
            url: self.config.board_url(&board.id),
            license: self.config.license.clone(),
            images: image_documents,
            buttons,
            sounds: Vec::new(),
            grid: ObfGrid {
                rows: order.len(),
                columns: self.config.columns,
                order,
            },
            description_html: board
                .name_key
                .as_deref()
                .map(|key| self.translations.format_message(key))
                .unwrap_or_default(),
            ext: self.extension_properties(|key| board.property(key), false),
        };

        debug!(
            board = %board.id,
            buttons = document.buttons.len(),
            images = document.images.len(),
            "Mapped board"
        );

        Some(MappedBoard {
            document,
            images: images.resolved,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Archive file key: the reference's own path for fetched images, or a
/// generated `custom/<board>/<tile>.<ext>` for inline ones.
fn file_key_for(board: &Board, tile: &Tile, reference: &str, artifact: &ImageArtifact) -> String {
    let path = if is_data_uri(reference) {
        String::new()
    } else {
        archive_path_for(reference)
    };
    if !path.is_empty() {
        return path;
    }
    match artifact.extension() {
        Some(ext) => format!("custom/{}/{}.{}", board.id, tile.id, ext),
        None => format!("custom/{}/{}", board.id, tile.id),
    }
}
