//! OBZ archive tests

mod common;

use board_export_sdk::export::obz::{MANIFEST_PATH, Manifest, ObzArchive, ObzAssembler};
use board_export_sdk::{Board, ExportConfig, Tile, Translations};
use common::{FakeFetcher, GIF_DATA_URI, GIF_PIXEL};
use serde_json::Value;
use std::io::{Cursor, Read};
use zip::ZipArchive;

async fn assemble(boards: &[Board], fetcher: &FakeFetcher) -> ObzArchive {
    let config = ExportConfig::default();
    let translations = Translations::default();
    ObzAssembler::new(&config, &translations, fetcher)
        .assemble(boards)
        .await
        .unwrap()
}

fn open(archive: &ObzArchive) -> ZipArchive<Cursor<Vec<u8>>> {
    ZipArchive::new(Cursor::new(archive.bytes.clone())).unwrap()
}

fn read_entry(zip: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Vec<u8> {
    let mut entry = zip.by_name(name).unwrap();
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).unwrap();
    bytes
}

/// Entry names in archive order
fn entry_names(zip: &mut ZipArchive<Cursor<Vec<u8>>>) -> Vec<String> {
    (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect()
}

fn board(id: &str, tiles: usize) -> Board {
    Board::new(id, id.to_uppercase())
        .with_tiles((0..tiles).map(|i| Tile::new(format!("{}-{}", id, i))))
}

mod manifest_root_tests {
    use super::*;

    #[tokio::test]
    async fn test_root_board_wins_regardless_of_order() {
        let fetcher = FakeFetcher::new();
        for boards in [
            vec![board("root", 1), board("b", 1)],
            vec![board("b", 1), board("root", 1)],
        ] {
            let archive = assemble(&boards, &fetcher).await;
            assert_eq!(archive.manifest.root.as_deref(), Some("boards/root.obf"));
        }
    }

    #[tokio::test]
    async fn test_root_falls_back_to_first_board() {
        let fetcher = FakeFetcher::new();
        let archive = assemble(&[board("a", 1), board("b", 1)], &fetcher).await;
        assert_eq!(archive.manifest.root.as_deref(), Some("boards/a.obf"));
    }

    /// Current behavior: when the first board is empty the root is not
    /// redirected to a written board, so it ends up null.
    #[tokio::test]
    async fn test_root_when_first_board_is_empty() {
        let fetcher = FakeFetcher::new();
        let archive = assemble(&[board("a", 0), board("b", 1)], &fetcher).await;

        assert_eq!(archive.skipped, vec!["a".to_string()]);
        assert!(!archive.manifest.paths.boards.contains_key("a"));
        assert!(archive.manifest.paths.boards.contains_key("b"));
        assert_eq!(archive.manifest.root, None);
    }
}

mod archive_layout_tests {
    use super::*;

    #[tokio::test]
    async fn test_entries_and_manifest_last() {
        let fetcher = FakeFetcher::new().with_image("/symbols/cat.gif", GIF_PIXEL, None);
        let boards = vec![
            board("root", 2).with_tile(Tile::new("cat").with_image("/symbols/cat.gif")),
            board("empty", 0),
            board("food", 1),
        ];
        let archive = assemble(&boards, &fetcher).await;
        let mut zip = open(&archive);

        let names = entry_names(&mut zip);
        assert_eq!(
            names,
            vec![
                "boards/root.obf",
                "images/symbols/cat.gif",
                "boards/food.obf",
                MANIFEST_PATH,
            ]
        );

        let manifest: Manifest =
            serde_json::from_slice(&read_entry(&mut zip, MANIFEST_PATH)).unwrap();
        assert_eq!(manifest, archive.manifest);
        assert_eq!(manifest.format, "open-board-0.1");
        assert_eq!(manifest.paths.boards.len(), 2);
        assert_eq!(
            manifest.paths.images.get("root_/symbols/cat.gif").map(String::as_str),
            Some("images/symbols/cat.gif")
        );

        assert_eq!(read_entry(&mut zip, "images/symbols/cat.gif"), GIF_PIXEL);
    }

    #[tokio::test]
    async fn test_documents_reference_images_by_path() {
        let fetcher = FakeFetcher::new();
        let boards = vec![board("root", 0).with_tile(Tile::new("t1").with_image(GIF_DATA_URI))];
        let archive = assemble(&boards, &fetcher).await;
        let mut zip = open(&archive);

        let document: Value =
            serde_json::from_slice(&read_entry(&mut zip, "boards/root.obf")).unwrap();
        let image = &document["images"][0];
        assert_eq!(image["path"], "images/custom/root/t1.gif");
        assert!(image.get("data").is_none());

        // the document path points at a real entry
        assert_eq!(read_entry(&mut zip, "images/custom/root/t1.gif"), GIF_PIXEL);
    }

    #[tokio::test]
    async fn test_shared_image_file_stored_once() {
        let fetcher = FakeFetcher::new().with_image("/symbols/dog.gif", GIF_PIXEL, None);
        let boards = vec![
            board("root", 0).with_tile(Tile::new("a").with_image("/symbols/dog.gif")),
            board("pets", 0).with_tile(Tile::new("b").with_image("/symbols/dog.gif")),
        ];
        let archive = assemble(&boards, &fetcher).await;
        let mut zip = open(&archive);

        let image_entries = entry_names(&mut zip)
            .into_iter()
            .filter(|name| name.starts_with("images/"))
            .count();
        assert_eq!(image_entries, 1);
        assert_eq!(archive.manifest.paths.images.len(), 2);
        assert!(archive.manifest.paths.images.contains_key("root_/symbols/dog.gif"));
        assert!(archive.manifest.paths.images.contains_key("pets_/symbols/dog.gif"));
    }

    #[tokio::test]
    async fn test_same_path_on_different_hosts_keeps_both_images() {
        let fetcher = FakeFetcher::new()
            .with_image("https://a.org/sym/x.png", b"AAAA", Some("image/png"))
            .with_image("https://b.org/sym/x.png", b"BBBB", Some("image/png"));
        let boards = vec![
            board("a", 0).with_tile(Tile::new("ta").with_image("https://a.org/sym/x.png")),
            board("b", 0).with_tile(Tile::new("tb").with_image("https://b.org/sym/x.png")),
        ];
        let archive = assemble(&boards, &fetcher).await;
        let mut zip = open(&archive);

        for (board_id, reference, bytes) in [
            ("a", "https://a.org/sym/x.png", b"AAAA"),
            ("b", "https://b.org/sym/x.png", b"BBBB"),
        ] {
            let document: Value =
                serde_json::from_slice(&read_entry(&mut zip, &format!("boards/{}.obf", board_id)))
                    .unwrap();
            let path = document["images"][0]["path"].as_str().unwrap().to_string();
            let image_id = format!("{}_{}", board_id, reference);
            assert_eq!(archive.manifest.paths.images.get(&image_id), Some(&path));
            assert_eq!(read_entry(&mut zip, &path), bytes);
        }

        let image_paths: Vec<&String> = archive.manifest.paths.images.values().collect();
        assert_ne!(image_paths[0], image_paths[1]);
    }

    #[tokio::test]
    async fn test_query_variants_are_distinct_files() {
        let fetcher = FakeFetcher::new()
            .with_image("/sym/x.png?v=1", b"one", Some("image/png"))
            .with_image("/sym/x.png?v=2", b"two", Some("image/png"));
        let boards = vec![board("root", 0).with_tiles([
            Tile::new("t1").with_image("/sym/x.png?v=1"),
            Tile::new("t2").with_image("/sym/x.png?v=2"),
        ])];
        let archive = assemble(&boards, &fetcher).await;
        let mut zip = open(&archive);

        let first = &archive.manifest.paths.images["root_/sym/x.png?v=1"];
        let second = &archive.manifest.paths.images["root_/sym/x.png?v=2"];
        assert_eq!(first, "images/sym/x.png");
        assert_eq!(second, "images/sym/x-2.png");
        assert_eq!(read_entry(&mut zip, first), b"one");
        assert_eq!(read_entry(&mut zip, second), b"two");
    }

    #[tokio::test]
    async fn test_parent_segments_stay_inside_images_dir() {
        let fetcher = FakeFetcher::new().with_image("/../../evil.png", b"x", Some("image/png"));
        let boards = vec![board("root", 0).with_tile(Tile::new("t").with_image("/../../evil.png"))];
        let archive = assemble(&boards, &fetcher).await;
        let mut zip = open(&archive);

        let names = entry_names(&mut zip);
        assert!(names.contains(&"images/evil.png".to_string()));
        assert!(names.iter().all(|name| !name.contains("..")));
    }

    #[tokio::test]
    async fn test_links_resolve_to_later_boards() {
        let fetcher = FakeFetcher::new();
        let boards = vec![
            board("root", 0).with_tile(Tile::new("go").with_load_board("food")),
            board("food", 1),
        ];
        let archive = assemble(&boards, &fetcher).await;
        let mut zip = open(&archive);

        let document: Value =
            serde_json::from_slice(&read_entry(&mut zip, "boards/root.obf")).unwrap();
        assert_eq!(document["buttons"][0]["load_board"]["path"], "boards/food.obf");
    }

    #[tokio::test]
    async fn test_entries_are_deflated() {
        let fetcher = FakeFetcher::new();
        let archive = assemble(&[board("root", 3)], &fetcher).await;
        let mut zip = open(&archive);
        let entry = zip.by_name("boards/root.obf").unwrap();
        assert_eq!(entry.compression(), zip::CompressionMethod::Deflated);
    }

    #[tokio::test]
    async fn test_all_empty_boards_give_manifest_only() {
        let fetcher = FakeFetcher::new();
        let archive = assemble(&[board("a", 0)], &fetcher).await;
        let mut zip = open(&archive);

        assert_eq!(entry_names(&mut zip), vec![MANIFEST_PATH]);
        assert!(archive.manifest.paths.boards.is_empty());
        assert_eq!(archive.manifest.root, None);
    }
}
