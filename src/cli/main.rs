//! board-export: export AAC boards to OBF, OBZ, native JSON or PDF

use anyhow::Context;
use board_export_sdk::cli::commands::export::{CliFormat, ExportArgs, handle_export};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "board-export", version, about)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum)]
    format: CliFormat,

    /// Boards JSON file (a board object or an array of boards), `-` for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Directory the artifact is written into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Export configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Message catalog (JSON object of id -> text)
    #[arg(short, long)]
    messages: Option<PathBuf>,

    /// Locale of the message catalog
    #[arg(long)]
    locale: Option<String>,

    /// Resolve image paths against this local directory
    #[arg(long, conflicts_with = "base_url")]
    assets_dir: Option<PathBuf>,

    /// Resolve relative image references against this URL
    #[arg(long)]
    base_url: Option<String>,

    /// Do not fetch images; only inline images are exported
    #[arg(long)]
    offline: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = ExportArgs {
        format: cli.format,
        input: cli.input,
        output_dir: cli.output_dir,
        config: cli.config,
        messages: cli.messages,
        locale: cli.locale,
        assets_dir: cli.assets_dir,
        base_url: cli.base_url,
        offline: cli.offline,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(handle_export(&args))?;
    Ok(())
}
