//! Export file naming
//!
//! Every artifact is named `<YYYY-MM-DD_HH-mm-ss->` + subject + `" "` +
//! suffix, where the subject is the board name for a single board and
//! `boardsset` otherwise.

use chrono::{Local, NaiveDateTime};

/// Subject used when more than one board is exported
pub const BOARDS_SET: &str = "boardsset";

/// Source of the export timestamp
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stuck at one instant
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Kind of artifact produced, which fixes its suffix and MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Single OBF document
    Obf,
    /// OBZ archive
    Obz,
    /// Native JSON dump
    Native,
    Pdf,
}

impl ArtifactKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            ArtifactKind::Obf => "board.obf",
            ArtifactKind::Obz => "board.obz",
            ArtifactKind::Native => "board.json",
            ArtifactKind::Pdf => "board.pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ArtifactKind::Obf => "application/json",
            ArtifactKind::Obz => "application/zip",
            ArtifactKind::Native => "text/json;charset=utf-8",
            ArtifactKind::Pdf => "application/pdf",
        }
    }
}

pub fn datetime_prefix(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d_%H-%M-%S-").to_string()
}

/// Replace characters that are not allowed in file names
pub fn sanitize_name(name: &str) -> String {
    name.replace("..", "_")
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Subject for a set of board names: the name itself for exactly one board
pub fn subject_for<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut names = names.into_iter();
    match (names.next(), names.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

pub fn export_filename(at: NaiveDateTime, subject: Option<&str>, kind: ArtifactKind) -> String {
    format!(
        "{}{} {}",
        datetime_prefix(at),
        sanitize_name(subject.unwrap_or(BOARDS_SET)),
        kind.suffix()
    )
}
