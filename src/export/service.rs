//! Export façade
//!
//! [`BoardExporter`] owns the configuration, message catalog, image fetcher
//! and clock for a session and turns boards into named [`ExportArtifact`]s.

use super::filename::{ArtifactKind, Clock, SystemClock, export_filename, subject_for};
use super::image::ImageFetcher;
use super::native::export_native;
use super::obf::{ObfMapper, index_boards};
use super::obz::ObzAssembler;
use super::{ExportArtifact, ExportError};
use crate::config::ExportConfig;
use crate::i18n::Translations;
use crate::models::Board;
use std::str::FromStr;
use tracing::info;

/// Output format family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// OBF for a single board, OBZ for a set
    OpenBoard,
    Native,
    Pdf,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openboard" | "obf" | "obz" => Ok(ExportFormat::OpenBoard),
            "native" | "json" | "cboard" => Ok(ExportFormat::Native),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// What to export: a single board, or a set of boards.
///
/// A set holding one board still produces an archive for OpenBoard exports.
#[derive(Debug, Clone, Copy)]
pub enum ExportRequest<'a> {
    One(&'a Board),
    Many(&'a [Board]),
}

impl<'a> ExportRequest<'a> {
    pub fn boards(&self) -> &'a [Board] {
        match *self {
            ExportRequest::One(board) => std::slice::from_ref(board),
            ExportRequest::Many(boards) => boards,
        }
    }
}

/// Produces export artifacts for boards
pub struct BoardExporter {
    config: ExportConfig,
    translations: Translations,
    fetcher: Box<dyn ImageFetcher>,
    clock: Box<dyn Clock>,
}

impl BoardExporter {
    pub fn new(
        config: ExportConfig,
        translations: Translations,
        fetcher: Box<dyn ImageFetcher>,
    ) -> Self {
        Self {
            config,
            translations,
            fetcher,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    fn artifact(&self, boards: &[Board], kind: ArtifactKind, bytes: Vec<u8>) -> ExportArtifact {
        let subject = subject_for(boards.iter().map(|b| b.name.as_str()));
        let artifact = ExportArtifact {
            filename: export_filename(self.clock.now(), subject, kind),
            mime_type: kind.mime_type().to_string(),
            bytes,
        };
        info!(filename = %artifact.filename, bytes = artifact.bytes.len(), "Export ready");
        artifact
    }

    /// Single self-contained OBF document with embedded images.
    /// `Ok(None)` when the board has no tiles.
    pub async fn export_board_obf(
        &self,
        board: &Board,
    ) -> Result<Option<ExportArtifact>, ExportError> {
        self.config.validate()?;
        let boards = std::slice::from_ref(board);
        let index = index_boards(boards);
        let mapper = ObfMapper::new(&self.config, &self.translations, self.fetcher.as_ref());

        let Some(mapped) = mapper.map_board(board, &index, true).await else {
            return Ok(None);
        };
        let bytes = super::to_pretty_json(&mapped.document)?;
        Ok(Some(self.artifact(boards, ArtifactKind::Obf, bytes)))
    }

    /// OBZ archive of every board
    pub async fn export_obz(&self, boards: &[Board]) -> Result<ExportArtifact, ExportError> {
        let assembler =
            ObzAssembler::new(&self.config, &self.translations, self.fetcher.as_ref());
        let archive = assembler.assemble(boards).await?;
        Ok(self.artifact(boards, ArtifactKind::Obz, archive.bytes))
    }

    pub async fn export_openboard(
        &self,
        request: ExportRequest<'_>,
    ) -> Result<Option<ExportArtifact>, ExportError> {
        match request {
            ExportRequest::One(board) => self.export_board_obf(board).await,
            ExportRequest::Many(boards) => self.export_obz(boards).await.map(Some),
        }
    }

    pub fn export_native(&self, boards: &[Board]) -> Result<ExportArtifact, ExportError> {
        let bytes = export_native(boards)?;
        Ok(self.artifact(boards, ArtifactKind::Native, bytes))
    }

    #[cfg(feature = "pdf-export")]
    pub async fn export_pdf(&self, boards: &[Board]) -> Result<ExportArtifact, ExportError> {
        let exporter =
            super::pdf::PdfExporter::new(&self.config, &self.translations, self.fetcher.as_ref());
        let document = exporter.export(boards, self.clock.now()).await?;
        Ok(self.artifact(boards, ArtifactKind::Pdf, document.bytes))
    }

    /// Export in any format. `Ok(None)` only for a single empty board
    /// exported as OBF.
    pub async fn export(
        &self,
        format: ExportFormat,
        request: ExportRequest<'_>,
    ) -> Result<Option<ExportArtifact>, ExportError> {
        match format {
            ExportFormat::OpenBoard => self.export_openboard(request).await,
            ExportFormat::Native => self.export_native(request.boards()).map(Some),
            #[cfg(feature = "pdf-export")]
            ExportFormat::Pdf => self.export_pdf(request.boards()).await.map(Some),
            #[cfg(not(feature = "pdf-export"))]
            ExportFormat::Pdf => Err(ExportError::UnsupportedFormat(
                "pdf (built without the pdf-export feature)".to_string(),
            )),
        }
    }
}
