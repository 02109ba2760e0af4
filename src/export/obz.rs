//! OBZ archive assembly
//!
//! An OBZ is a zip archive with one OBF document per board under `boards/`,
//! the referenced image files under `images/`, and a `manifest.json` naming
//! the root board and every path.

use super::ExportError;
use super::image::ImageFetcher;
use super::obf::{OBF_FORMAT, ObfMapper, board_path, index_boards};
use crate::config::ExportConfig;
use crate::i18n::Translations;
use crate::models::Board;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{Cursor, Write};
use tracing::{debug, info, warn};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const MANIFEST_PATH: &str = "manifest.json";

/// Board id that is always preferred as the archive root
pub const ROOT_BOARD_ID: &str = "root";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ManifestPaths {
    /// Board id -> document path
    pub boards: BTreeMap<String, String>,
    /// Image id -> image file path
    pub images: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub format: String,
    /// Path of the board a reader should open first
    pub root: Option<String>,
    pub paths: ManifestPaths,
}

/// A finished archive
#[derive(Debug, Clone)]
pub struct ObzArchive {
    pub bytes: Vec<u8>,
    pub manifest: Manifest,
    /// Boards left out because they had no tiles
    pub skipped: Vec<String>,
}

/// Pick the manifest root.
///
/// A written board with id `root` wins. Otherwise the first board of the
/// input is used even when it was skipped, which leaves the root pointing at
/// a path missing from `paths.boards` (`None` here).
fn select_root(boards: &[Board], paths: &ManifestPaths) -> Option<String> {
    paths
        .boards
        .get(ROOT_BOARD_ID)
        .or_else(|| boards.first().and_then(|first| paths.boards.get(&first.id)))
        .cloned()
}

/// Image files claimed in one archive. Each distinct reference owns one
/// path; a key already owned by another reference gets a numbered suffix.
#[derive(Default)]
struct ImageFiles {
    taken: HashSet<String>,
    paths: HashMap<String, String>,
}

impl ImageFiles {
    /// Archive path for `reference`, and whether its bytes still need writing
    fn claim(&mut self, reference: &str, file_key: &str) -> (String, bool) {
        if let Some(path) = self.paths.get(reference) {
            return (path.clone(), false);
        }

        let mut path = format!("images/{}", file_key);
        let mut n = 2;
        while self.taken.contains(&path) {
            path = format!("images/{}", numbered(file_key, n));
            n += 1;
        }
        self.taken.insert(path.clone());
        self.paths.insert(reference.to_string(), path.clone());
        (path, true)
    }
}

/// `sym/x.png` -> `sym/x-2.png`
fn numbered(file_key: &str, n: usize) -> String {
    match file_key.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !stem.ends_with('/') && !ext.contains('/') => {
            format!("{}-{}.{}", stem, n, ext)
        }
        _ => format!("{}-{}", file_key, n),
    }
}

fn start_entry(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    path: &str,
    options: SimpleFileOptions,
    content: &[u8],
) -> Result<(), ExportError> {
    zip.start_file(path, options)
        .map_err(|e| ExportError::ArchiveError(format!("Failed to add {}: {}", path, e)))?;
    zip.write_all(content)
        .map_err(|e| ExportError::IoError(format!("Failed to write {}: {}", path, e)))
}

/// Builds OBZ archives from a list of boards
pub struct ObzAssembler<'a> {
    config: &'a ExportConfig,
    mapper: ObfMapper<'a>,
}

impl<'a> ObzAssembler<'a> {
    pub fn new(
        config: &'a ExportConfig,
        translations: &'a Translations,
        fetcher: &'a dyn ImageFetcher,
    ) -> Self {
        Self {
            config,
            mapper: ObfMapper::new(config, translations, fetcher),
        }
    }

    /// Map every board in input order and package the results.
    ///
    /// Boards without tiles contribute nothing. An image referenced by
    /// several boards is stored once; distinct references never share a file.
    pub async fn assemble(&self, boards: &[Board]) -> Result<ObzArchive, ExportError> {
        self.config.validate()?;
        let index = index_boards(boards);
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(self.config.zip_compression_level));

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut paths = ManifestPaths::default();
        let mut documents: HashSet<String> = HashSet::new();
        let mut image_files = ImageFiles::default();
        let mut skipped = Vec::new();

        for board in boards {
            let Some(mut mapped) = self.mapper.map_board(board, &index, false).await else {
                skipped.push(board.id.clone());
                continue;
            };

            let document_path = board_path(&board.id);
            if !documents.insert(document_path.clone()) {
                warn!(board = %board.id, "Duplicate board id, keeping the first document");
                continue;
            }

            let mut new_files = Vec::new();
            for image in &mapped.images {
                let (image_path, is_new) = image_files.claim(&image.reference, &image.file_key);
                if image_path != image.archive_path() {
                    debug!(reference = %image.reference, path = %image_path, "Image key taken, renamed");
                    for entry in mapped.document.images.iter_mut().filter(|e| e.id == image.id) {
                        entry.path = Some(image_path.clone());
                    }
                }
                if is_new {
                    new_files.push((image_path.clone(), &image.artifact.bytes));
                } else {
                    debug!(path = %image_path, "Image file already in archive");
                }
                paths.images.insert(image.id.clone(), image_path);
            }

            let document = super::to_pretty_json(&mapped.document)?;
            start_entry(&mut zip, &document_path, options, &document)?;
            for (image_path, bytes) in new_files {
                start_entry(&mut zip, &image_path, options, bytes)?;
            }

            paths.boards.insert(board.id.clone(), document_path);
        }

        let manifest = Manifest {
            format: OBF_FORMAT.to_string(),
            root: select_root(boards, &paths),
            paths,
        };
        if manifest.root.is_none() && !manifest.paths.boards.is_empty() {
            warn!("First board was not exported; manifest root is empty");
        }
        start_entry(
            &mut zip,
            MANIFEST_PATH,
            options,
            &super::to_pretty_json(&manifest)?,
        )?;

        let bytes = zip
            .finish()
            .map_err(|e| ExportError::ArchiveError(format!("Failed to finalize archive: {}", e)))?
            .into_inner();

        info!(
            boards = manifest.paths.boards.len(),
            images = manifest.paths.images.len(),
            skipped = skipped.len(),
            bytes = bytes.len(),
            "Assembled OBZ archive"
        );

        Ok(ObzArchive {
            bytes,
            manifest,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tile;

    fn paths_for(ids: &[&str]) -> ManifestPaths {
        ManifestPaths {
            boards: ids
                .iter()
                .map(|id| (id.to_string(), board_path(id)))
                .collect(),
            images: BTreeMap::new(),
        }
    }

    #[test]
    fn test_image_files_share_identical_references() {
        let mut files = ImageFiles::default();
        assert_eq!(
            files.claim("https://a.org/sym/x.png", "sym/x.png"),
            ("images/sym/x.png".to_string(), true)
        );
        assert_eq!(
            files.claim("https://a.org/sym/x.png", "sym/x.png"),
            ("images/sym/x.png".to_string(), false)
        );
    }

    #[test]
    fn test_image_files_rename_clashing_keys() {
        let mut files = ImageFiles::default();
        files.claim("https://a.org/sym/x.png", "sym/x.png");
        assert_eq!(
            files.claim("https://b.org/sym/x.png", "sym/x.png"),
            ("images/sym/x-2.png".to_string(), true)
        );
        assert_eq!(
            files.claim("/sym/x.png?v=3", "sym/x.png"),
            ("images/sym/x-3.png".to_string(), true)
        );
    }

    #[test]
    fn test_numbered_keys() {
        assert_eq!(numbered("sym/x.png", 2), "sym/x-2.png");
        assert_eq!(numbered("sym/x", 2), "sym/x-2");
        assert_eq!(numbered("v1.0/x", 4), "v1.0/x-4");
        assert_eq!(numbered("sym/.hidden", 2), "sym/.hidden-2");
    }

    #[test]
    fn test_root_prefers_root_id() {
        let boards = vec![Board::new("a", "A"), Board::new("root", "Home")];
        let root = select_root(&boards, &paths_for(&["a", "root"]));
        assert_eq!(root.as_deref(), Some("boards/root.obf"));
    }

    #[test]
    fn test_root_falls_back_to_first_input_board() {
        let boards = vec![Board::new("a", "A"), Board::new("b", "B")];
        let root = select_root(&boards, &paths_for(&["a", "b"]));
        assert_eq!(root.as_deref(), Some("boards/a.obf"));
    }

    #[test]
    fn test_root_missing_when_first_board_skipped() {
        let boards = vec![
            Board::new("empty", "Empty"),
            Board::new("b", "B").with_tile(Tile::new("t")),
        ];
        let root = select_root(&boards, &paths_for(&["b"]));
        assert_eq!(root, None);
    }
}
