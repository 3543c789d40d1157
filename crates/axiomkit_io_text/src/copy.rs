//! Text copy orchestration: open, stream units through the transform, report.

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::report::{ReportTextCopy, ReportTextCopyBuilder};
use crate::spec::{CopyTextError, EnumCopyTextStage, SpecTextCopyOptions};
use crate::unit::UnitReader;
use crate::util::{copy_file_metadata, display_path, is_same_file, open_destination, open_source};

/// Copy `file_source` to `file_destination`, transforming it unit by unit.
///
/// Behavior is controlled by [`SpecTextCopyOptions`]:
/// - granularity (byte, character, line),
/// - transform (identity, uppercase),
/// - word/vowel counting,
/// - create-or-truncate vs create-or-append,
/// - line terminator for line granularity,
/// - optional metadata preservation.
///
/// This function performs:
/// 1. Option validation.
/// 2. Source acquisition. A missing or unreadable source fails before the
///    destination is created or truncated.
/// 3. Destination acquisition.
/// 4. One sequential pass over the source, writing each transformed unit.
/// 5. Flush and release of both handles, then optional metadata copy.
///
/// Both handles are released on every exit path. A mid-stream failure leaves
/// the destination partially written; no rollback is attempted.
pub fn copy_text<P, Q>(
    file_source: P,
    file_destination: Q,
    spec_options: SpecTextCopyOptions,
) -> Result<ReportTextCopy, CopyTextError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    spec_options.validate()?;

    let path_file_src = file_source.as_ref().to_path_buf();
    let path_file_dst = file_destination.as_ref().to_path_buf();

    let file_src = open_source(&path_file_src)?;
    if is_same_file(&file_src, &path_file_src, &path_file_dst) {
        return Err(CopyTextError::SourceDestinationSame {
            path_src: path_file_src,
            path_dst: path_file_dst,
        });
    }
    let file_dst = open_destination(&path_file_dst, spec_options.if_append)?;

    tracing::debug!(
        source = %display_path(&path_file_src),
        destination = %display_path(&path_file_dst),
        granularity = ?spec_options.granularity,
        transform = ?spec_options.transform,
        append = spec_options.if_append,
        "text copy started"
    );

    let report = run_pipeline(file_src, file_dst, &spec_options)
        .map_err(|e| _attach_path(e, &path_file_src, &path_file_dst))?;

    if spec_options.if_preserve_metadata {
        copy_file_metadata(&path_file_src, &path_file_dst).map_err(|e| {
            CopyTextError::io(EnumCopyTextStage::Metadata, Some(path_file_dst.clone()), e)
        })?;
    }

    tracing::debug!(
        destination = %path_file_dst.display(),
        empty_source = report.is_empty(),
        "text copy finished: {report}"
    );
    Ok(report)
}

/// Run the same pipeline as [`copy_text`] over an arbitrary reader/writer pair.
///
/// Useful for stdin/stdout or in-memory buffers. `if_append` and
/// `if_preserve_metadata` have no effect here; errors carry no path.
pub fn copy_text_stream<R, W>(
    reader: R,
    writer: W,
    spec_options: SpecTextCopyOptions,
) -> Result<ReportTextCopy, CopyTextError>
where
    R: Read,
    W: Write,
{
    spec_options.validate()?;
    let report = run_pipeline(reader, writer, &spec_options)?;
    tracing::debug!("text stream copy finished: {report}");
    Ok(report)
}

fn run_pipeline<R: Read, W: Write>(
    reader: R,
    writer: W,
    spec_options: &SpecTextCopyOptions,
) -> Result<ReportTextCopy, CopyTextError> {
    let reader = BufReader::with_capacity(spec_options.buffer_capacity, reader);
    let mut writer = BufWriter::with_capacity(spec_options.buffer_capacity, writer);
    let mut builder_report =
        ReportTextCopyBuilder::new(spec_options.if_count_words, spec_options.if_count_vowels);

    if let Err(err) = drain_units(reader, &mut writer, spec_options, &mut builder_report) {
        if let Err(e_flush) = writer.flush() {
            tracing::warn!(error = %e_flush, "flush after failed copy also failed");
            return Err(err.with_suppressed(e_flush));
        }
        return Err(err);
    }

    writer
        .flush()
        .map_err(|e| CopyTextError::io(EnumCopyTextStage::Flush, None, e))?;
    Ok(builder_report.build())
}

fn drain_units<R: Read, W: Write>(
    reader: BufReader<R>,
    writer: &mut W,
    spec_options: &SpecTextCopyOptions,
    builder_report: &mut ReportTextCopyBuilder,
) -> Result<(), CopyTextError> {
    for res_unit in UnitReader::new(reader, spec_options.granularity) {
        let (unit, n_bytes_read) =
            res_unit.map_err(|e| CopyTextError::io(EnumCopyTextStage::Read, None, e))?;
        builder_report.add_bytes_read(n_bytes_read);
        unit.observe(builder_report);

        let n_bytes_written = unit
            .write_transformed(writer, spec_options.transform, spec_options.line_terminator)
            .map_err(|e| CopyTextError::io(EnumCopyTextStage::Write, None, e))?;
        builder_report.add_bytes_written(n_bytes_written);
    }
    Ok(())
}

fn _attach_path(err: CopyTextError, path_file_src: &Path, path_file_dst: &Path) -> CopyTextError {
    let path_failed: PathBuf = match &err {
        CopyTextError::Io {
            stage: EnumCopyTextStage::Read,
            ..
        } => path_file_src.to_path_buf(),
        _ => path_file_dst.to_path_buf(),
    };
    err.with_path(path_failed)
}
