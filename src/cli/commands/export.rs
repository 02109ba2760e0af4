//! Export command implementation

use crate::cli::error::CliError;
use crate::cli::output::format_export_summary;
use crate::config::ExportConfig;
use crate::delivery::{FileSystemSink, deliver};
use crate::export::image::{HttpImageFetcher, ImageFetcher, OfflineImageFetcher, StorageImageFetcher};
use crate::export::native::import_native;
use crate::export::{BoardExporter, ExportFormat, ExportRequest};
use crate::i18n::{DEFAULT_LOCALE, Translations};
use crate::models::Board;
use crate::storage::filesystem::FileSystemStorageBackend;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Single OBF document (exactly one board)
    Obf,
    /// OBZ archive
    Obz,
    /// Native JSON dump
    Native,
    Pdf,
}

/// Arguments for the `export` command
pub struct ExportArgs {
    pub format: CliFormat,
    /// Boards JSON file, or `-` for stdin
    pub input: String,
    pub output_dir: PathBuf,
    pub config: Option<PathBuf>,
    /// Message catalog JSON
    pub messages: Option<PathBuf>,
    pub locale: Option<String>,
    /// Local directory image paths resolve against
    pub assets_dir: Option<PathBuf>,
    /// Base URL for relative image references
    pub base_url: Option<String>,
    /// Only embed inline images
    pub offline: bool,
}

/// Boards file contents: a single board object, or an array of boards as
/// written by a native export
#[derive(Debug)]
pub enum BoardInput {
    Many(Vec<Board>),
    One(Box<Board>),
}

impl BoardInput {
    pub fn boards(&self) -> &[Board] {
        match self {
            BoardInput::Many(boards) => boards,
            BoardInput::One(board) => std::slice::from_ref(board.as_ref()),
        }
    }

    /// Request for a format. OBF needs exactly one board; OBZ always
    /// archives, even a single board.
    pub fn request_for(&self, format: CliFormat) -> Result<ExportRequest<'_>, CliError> {
        match (format, self.boards()) {
            (CliFormat::Obf, [only]) => Ok(ExportRequest::One(only)),
            (CliFormat::Obf, boards) => Err(CliError::InvalidArgument(format!(
                "obf exports exactly one board, input has {}",
                boards.len()
            ))),
            (_, boards) => Ok(ExportRequest::Many(boards)),
        }
    }
}

pub fn parse_boards(content: &str) -> Result<BoardInput, CliError> {
    if content.trim_start().starts_with('[') {
        return import_native(content.as_bytes())
            .map(BoardInput::Many)
            .map_err(|e| CliError::BoardParseError(e.to_string()));
    }
    serde_json::from_str(content)
        .map(|board| BoardInput::One(Box::new(board)))
        .map_err(|e| CliError::BoardParseError(e.to_string()))
}

/// Load input content from file or stdin
fn load_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        let path = PathBuf::from(input);
        std::fs::read_to_string(&path).map_err(|e| CliError::FileReadError(path, e.to_string()))
    }
}

fn build_fetcher(args: &ExportArgs, config: &ExportConfig) -> Box<dyn ImageFetcher> {
    if args.offline {
        return Box::new(OfflineImageFetcher);
    }
    if let Some(dir) = &args.assets_dir {
        debug!(assets = %dir.display(), "Resolving images from local assets");
        return Box::new(StorageImageFetcher::new(FileSystemStorageBackend::new(dir)));
    }
    let base_url = args
        .base_url
        .clone()
        .or_else(|| config.asset_base_url.clone());
    Box::new(HttpImageFetcher::new(base_url))
}

/// Handle the export command
pub async fn handle_export(args: &ExportArgs) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => ExportConfig::load(path)?,
        None => ExportConfig::default(),
    };
    let locale = args.locale.as_deref().unwrap_or(DEFAULT_LOCALE);
    let translations = match &args.messages {
        Some(path) => Translations::load(locale, path)?,
        None => Translations::new(locale),
    };

    let input = parse_boards(&load_input(&args.input)?)?;
    let request = input.request_for(args.format)?;
    let format = match args.format {
        CliFormat::Obf | CliFormat::Obz => ExportFormat::OpenBoard,
        CliFormat::Native => ExportFormat::Native,
        CliFormat::Pdf => ExportFormat::Pdf,
    };

    let fetcher = build_fetcher(args, &config);
    let platform = config.platform;
    let exporter = BoardExporter::new(config, translations, fetcher);
    let artifact = exporter.export(format, request).await?.ok_or_else(|| {
        CliError::NothingToExport("the board has no tiles".to_string())
    })?;

    std::fs::create_dir_all(&args.output_dir).map_err(|e| {
        CliError::InvalidArgument(format!(
            "Cannot create output directory {}: {}",
            args.output_dir.display(),
            e
        ))
    })?;
    let sink =
        FileSystemSink::for_platform(FileSystemStorageBackend::new(&args.output_dir), platform);
    let location = deliver(&sink, &artifact).await?;

    println!(
        "{}",
        format_export_summary(&artifact, &args.output_dir.join(location).display().to_string())
    );
    Ok(())
}
