//! Text copy specification models and top-level error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default read/write buffer capacity in bytes.
pub const N_BUFFER_CAPACITY_DEFAULT: usize = 8 * 1024;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Unit size at which the source stream is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumTextGranularity {
    /// One raw byte per unit.
    Byte,
    /// One UTF-8 decoded character per unit.
    #[default]
    Character,
    /// One line per unit, terminator stripped.
    Line,
}

/// Transform applied to every unit before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumTextTransform {
    /// Write the unit unchanged.
    #[default]
    Identity,
    /// Map the unit to upper case (ASCII-only for bytes).
    Uppercase,
}

/// Line terminator written after each line under [`EnumTextGranularity::Line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumLineTerminator {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl EnumLineTerminator {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Lf => b"\n",
            Self::CrLf => b"\r\n",
        }
    }
}

/// Pipeline stage at which an I/O failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCopyTextStage {
    OpenSource,
    OpenDestination,
    Read,
    Write,
    Flush,
    Metadata,
}

impl fmt::Display for EnumCopyTextStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c_stage = match self {
            Self::OpenSource => "open source",
            Self::OpenDestination => "open destination",
            Self::Read => "read",
            Self::Write => "write",
            Self::Flush => "flush",
            Self::Metadata => "copy metadata",
        };
        f.write_str(c_stage)
    }
}

/// Coarse error classification exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCopyTextErrorKind {
    /// Source path does not exist.
    NotFound,
    /// Access denied on source or destination.
    Permission,
    /// Any other failure, including validation and mid-stream faults.
    Io,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `copy_text` / `copy_text_stream`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecTextCopyOptions {
    /// Processing unit size.
    pub granularity: EnumTextGranularity,
    /// Per-unit transform.
    pub transform: EnumTextTransform,
    /// Count vowels (`a e i o u`, case-insensitive) in the source.
    pub if_count_vowels: bool,
    /// Count whitespace-delimited words in the source.
    pub if_count_words: bool,
    /// Open destination in create-or-append mode instead of create-or-truncate.
    pub if_append: bool,
    /// Terminator written after each line (line granularity only).
    pub line_terminator: EnumLineTerminator,
    /// Copy permissions, timestamps and extended attributes to destination (Linux).
    /// Not allowed together with `if_append`.
    pub if_preserve_metadata: bool,
    /// Capacity of the read and write buffers in bytes.
    pub buffer_capacity: usize,
}

impl Default for SpecTextCopyOptions {
    fn default() -> Self {
        Self {
            granularity: EnumTextGranularity::Character,
            transform: EnumTextTransform::Identity,
            if_count_vowels: false,
            if_count_words: false,
            if_append: false,
            line_terminator: EnumLineTerminator::Lf,
            if_preserve_metadata: false,
            buffer_capacity: N_BUFFER_CAPACITY_DEFAULT,
        }
    }
}

impl SpecTextCopyOptions {
    /// Reject option combinations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), CopyTextError> {
        if self.buffer_capacity == 0 {
            return Err(CopyTextError::InvalidOptions(
                "Arg `buffer_capacity` must be >= 1.".to_string(),
            ));
        }
        if self.if_preserve_metadata && self.if_append {
            return Err(CopyTextError::InvalidOptions(
                "`if_preserve_metadata` cannot be combined with `if_append`.".to_string(),
            ));
        }
        Ok(())
    }
}

/// "Top-level call failed" errors. Every variant is terminal for the run.
#[derive(Debug, Error)]
pub enum CopyTextError {
    /// Invalid option value.
    #[error("{0}")]
    InvalidOptions(String),

    /// Source path does not exist.
    #[error("Source not found: {}", .path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Access denied while opening source or destination.
    #[error("Permission denied: {}", .path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Source path names a directory.
    #[error("Source is a directory: {}", .0.display())]
    SourceIsDirectory(PathBuf),

    /// Destination already exists and is the source file itself.
    #[error(
        "Source and destination are the same file: {} <-> {}",
        .path_src.display(),
        .path_dst.display()
    )]
    SourceDestinationSame { path_src: PathBuf, path_dst: PathBuf },

    /// Any other read/write failure.
    #[error("Failed to {stage}{}: {source}", _fmt_optional_path(.path.as_ref()))]
    Io {
        stage: EnumCopyTextStage,
        /// `None` when the run was driven through `copy_text_stream`.
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
        /// Secondary failure while releasing the destination.
        suppressed: Option<io::Error>,
    },
}

impl CopyTextError {
    /// Map onto the coarse not-found / permission / io classification.
    pub fn kind(&self) -> EnumCopyTextErrorKind {
        match self {
            Self::SourceNotFound { .. } => EnumCopyTextErrorKind::NotFound,
            Self::PermissionDenied { .. } => EnumCopyTextErrorKind::Permission,
            Self::InvalidOptions(_)
            | Self::SourceIsDirectory(_)
            | Self::SourceDestinationSame { .. }
            | Self::Io { .. } => EnumCopyTextErrorKind::Io,
        }
    }

    /// Secondary close-time error, if one occurred after the primary failure.
    pub fn suppressed(&self) -> Option<&io::Error> {
        match self {
            Self::Io { suppressed, .. } => suppressed.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn io(stage: EnumCopyTextStage, path: Option<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            stage,
            path,
            source,
            suppressed: None,
        }
    }

    pub(crate) fn with_suppressed(mut self, error_secondary: io::Error) -> Self {
        if let Self::Io { suppressed, .. } = &mut self {
            *suppressed = Some(error_secondary);
        }
        self
    }

    pub(crate) fn with_path(mut self, path_new: PathBuf) -> Self {
        if let Self::Io { path, .. } = &mut self {
            *path = Some(path_new);
        }
        self
    }
}

fn _fmt_optional_path(path: Option<&PathBuf>) -> String {
    match path {
        Some(p) => format!(" {}", p.display()),
        None => String::new(),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
