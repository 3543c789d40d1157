//! `axiomkit_io_text` v1:
//! Rust-side text transform-copy engine.
//!
//! Architecture follows the `io/fs` module split:
//! - `copy`   : open, stream, transform and write orchestration
//! - `spec`   : enums/options/errors
//! - `report` : run-time statistics model
//! - `unit`   : byte / character / line unit readers and transforms
//! - `util`   : handle acquisition, path and metadata helpers

pub mod copy;
pub mod report;
pub mod spec;
mod unit;
mod util;

pub use copy::{copy_text, copy_text_stream};
pub use report::{ReportTextCopy, ReportTextCopyBuilder};
pub use spec::{
    CopyTextError, EnumCopyTextErrorKind, EnumCopyTextStage, EnumLineTerminator,
    EnumTextGranularity, EnumTextTransform, N_BUFFER_CAPACITY_DEFAULT, SpecTextCopyOptions,
};
