use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::spec::{CopyTextError, EnumCopyTextStage};

////////////////////////////////////////////////////////////////////////////////
// #region HandleAcquisition

fn _classify_open_error(path: &Path, e: io::Error, stage: EnumCopyTextStage) -> CopyTextError {
    match e.kind() {
        io::ErrorKind::NotFound if stage == EnumCopyTextStage::OpenSource => {
            CopyTextError::SourceNotFound {
                path: path.to_path_buf(),
                source: e,
            }
        }
        io::ErrorKind::PermissionDenied => CopyTextError::PermissionDenied {
            path: path.to_path_buf(),
            source: e,
        },
        _ => CopyTextError::io(stage, Some(path.to_path_buf()), e),
    }
}

/// Open the source for reading. Never touches the destination.
pub(crate) fn open_source(path_file_src: &Path) -> Result<File, CopyTextError> {
    let file_src = File::open(path_file_src)
        .map_err(|e| _classify_open_error(path_file_src, e, EnumCopyTextStage::OpenSource))?;
    let meta_file_src = file_src.metadata().map_err(|e| {
        CopyTextError::io(
            EnumCopyTextStage::OpenSource,
            Some(path_file_src.to_path_buf()),
            e,
        )
    })?;
    if meta_file_src.is_dir() {
        return Err(CopyTextError::SourceIsDirectory(
            path_file_src.to_path_buf(),
        ));
    }
    Ok(file_src)
}

/// Open the destination create-or-truncate, or create-or-append.
pub(crate) fn open_destination(path_file_dst: &Path, if_append: bool) -> Result<File, CopyTextError> {
    let mut cfg_open = OpenOptions::new();
    cfg_open.create(true);
    if if_append {
        cfg_open.append(true);
    } else {
        cfg_open.write(true).truncate(true);
    }
    cfg_open
        .open(path_file_dst)
        .map_err(|e| _classify_open_error(path_file_dst, e, EnumCopyTextStage::OpenDestination))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

fn _normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// True when `path_file_dst` already exists and resolves to the opened source file.
pub(crate) fn is_same_file(file_src: &File, path_file_src: &Path, path_file_dst: &Path) -> bool {
    let Ok(meta_file_dst) = fs::metadata(path_file_dst) else {
        return false;
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;

        let _ = path_file_src;
        match file_src.metadata() {
            Ok(meta_file_src) => {
                (meta_file_src.dev(), meta_file_src.ino())
                    == (meta_file_dst.dev(), meta_file_dst.ino())
            }
            Err(_) => false,
        }
    }
    #[cfg(not(unix))]
    {
        let _ = (file_src, meta_file_dst);
        _normalize_path(path_file_src) == _normalize_path(path_file_dst)
    }
}

/// Absolute form of `path` for log output.
pub(crate) fn display_path(path: &Path) -> String {
    _normalize_path(path).display().to_string()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Metadata

/// Copy permission bits, timestamps and extended attributes (Linux only).
pub(crate) fn copy_file_metadata(path_file_src: &Path, path_file_dst: &Path) -> io::Result<()> {
    #[cfg(target_os = "linux")]
    {
        apply_metadata_linux(path_file_src, path_file_dst)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = (path_file_src, path_file_dst);
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn apply_metadata_linux(path_file_src: &Path, path_file_dst: &Path) -> io::Result<()> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    copy_xattrs_linux(path_file_src, path_file_dst);
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = %path_file_src.display(), error = %e, "listing xattrs failed");
            return;
        }
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        if let Err(e) = xattr::set(path_file_dst, &name, &raw_value) {
            tracing::warn!(
                path = %path_file_dst.display(),
                name = %name.to_string_lossy(),
                error = %e,
                "setting xattr failed"
            );
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::path::Path;

    use tempfile::TempDir;

    use super::{_classify_open_error, is_same_file, open_destination, open_source};
    use crate::spec::{CopyTextError, EnumCopyTextErrorKind, EnumCopyTextStage};

    #[test]
    fn open_source_missing_is_not_found() {
        let tmp = TempDir::new().expect("tempdir");
        let err = open_source(&tmp.path().join("missing.txt")).expect_err("must fail");
        assert!(matches!(err, CopyTextError::SourceNotFound { .. }));
        assert_eq!(err.kind(), EnumCopyTextErrorKind::NotFound);
    }

    #[test]
    fn classify_open_error_by_kind_and_stage() {
        let path = Path::new("locked.txt");
        for stage in [
            EnumCopyTextStage::OpenSource,
            EnumCopyTextStage::OpenDestination,
        ] {
            let err = _classify_open_error(
                path,
                io::Error::from(io::ErrorKind::PermissionDenied),
                stage,
            );
            assert!(matches!(err, CopyTextError::PermissionDenied { .. }));
            assert_eq!(err.kind(), EnumCopyTextErrorKind::Permission);
        }

        let err = _classify_open_error(
            path,
            io::Error::from(io::ErrorKind::NotFound),
            EnumCopyTextStage::OpenDestination,
        );
        assert!(matches!(
            err,
            CopyTextError::Io {
                stage: EnumCopyTextStage::OpenDestination,
                ..
            }
        ));
        assert_eq!(err.kind(), EnumCopyTextErrorKind::Io);
    }

    #[test]
    fn open_source_directory_rejected() {
        let tmp = TempDir::new().expect("tempdir");
        let err = open_source(tmp.path()).expect_err("must fail");
        assert!(matches!(err, CopyTextError::SourceIsDirectory(_)));
    }

    #[test]
    fn open_destination_missing_parent_is_io() {
        let tmp = TempDir::new().expect("tempdir");
        let err = open_destination(&tmp.path().join("no/such/dir.txt"), false)
            .expect_err("must fail");
        assert_eq!(err.kind(), EnumCopyTextErrorKind::Io);
    }

    #[test]
    fn open_destination_append_keeps_content() {
        let tmp = TempDir::new().expect("tempdir");
        let path_dst = tmp.path().join("out.txt");
        std::fs::write(&path_dst, "head\n").expect("seed");

        let mut file_dst = open_destination(&path_dst, true).expect("open");
        file_dst.write_all(b"tail\n").expect("write");
        drop(file_dst);
        assert_eq!(std::fs::read_to_string(&path_dst).expect("read"), "head\ntail\n");

        let file_dst = open_destination(&path_dst, false).expect("open");
        drop(file_dst);
        assert_eq!(std::fs::read(&path_dst).expect("read").len(), 0);
    }

    #[test]
    fn same_file_detection() {
        let tmp = TempDir::new().expect("tempdir");
        let path_src = tmp.path().join("in.txt");
        std::fs::write(&path_src, "x").expect("seed");
        let file_src = open_source(&path_src).expect("open");

        assert!(is_same_file(&file_src, &path_src, &path_src));
        assert!(is_same_file(
            &file_src,
            &path_src,
            &tmp.path().join(".").join("in.txt")
        ));
        assert!(!is_same_file(&file_src, &path_src, &tmp.path().join("out.txt")));
    }
}
