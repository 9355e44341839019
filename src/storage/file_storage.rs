use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid notebook document: {0}")]
    InvalidDocument(String),

    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Indentation used for the verbatim backup copy.
pub const BACKUP_INDENT: &[u8] = b"  ";

/// Indentation used for the migrated notebook.
pub const NOTEBOOK_INDENT: &[u8] = b"    ";

/// Read and decode a notebook document.
pub fn load_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&content)?;
    Ok(document)
}

/// Serialize `value` as pretty JSON with the given indentation.
///
/// Non-ASCII text is written literally and no trailing newline is added.
pub fn to_json_bytes(value: &Value, indent: &[u8]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// Write `value` to `path` and sync it to disk before returning.
pub fn write_document_synced(path: &Path, value: &Value, indent: &[u8]) -> Result<()> {
    let bytes = to_json_bytes(value, indent)?;
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}

/// Replace `path` with `value` via a synced temp file in the same directory.
///
/// A symlinked `path` is resolved so the link target is replaced, and the
/// existing file's permissions carry over to the new contents. If serialization
/// or the temp write fails, the existing file is left untouched.
pub fn write_document_atomic(path: &Path, value: &Value, indent: &[u8]) -> Result<()> {
    let bytes = to_json_bytes(value, indent)?;
    let target = match fs::canonicalize(path) {
        Ok(resolved) => resolved,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => path.to_path_buf(),
        Err(e) => return Err(e.into()),
    };
    let permissions = match fs::metadata(&target) {
        Ok(meta) => Some(meta.permissions()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    let mut tmp = NamedTempFile::new_in(parent_dir_or_dot(&target))?;
    tmp.as_file_mut().write_all(&bytes)?;
    tmp.as_file_mut().flush()?;
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.as_file().sync_all()?;

    tmp.persist(&target).map_err(|e| StorageError::Persist {
        path: target.display().to_string(),
        source: e.error,
    })?;
    Ok(())
}

fn parent_dir_or_dot(path: &Path) -> &Path {
    // `Path::parent` yields `Some("")` for bare file names.
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_indentation_and_literal_unicode() {
        let doc = json!({ "cells": [{ "source": "héllo ✓" }] });

        let two = String::from_utf8(to_json_bytes(&doc, BACKUP_INDENT).unwrap()).unwrap();
        assert_eq!(
            two,
            "{\n  \"cells\": [\n    {\n      \"source\": \"héllo ✓\"\n    }\n  ]\n}"
        );

        let four = String::from_utf8(to_json_bytes(&doc, NOTEBOOK_INDENT).unwrap()).unwrap();
        assert!(four.starts_with("{\n    \"cells\": ["));
        assert!(!four.ends_with('\n'));
        assert!(!four.contains("\\u"));
    }

    #[test]
    fn test_key_order_preserved() {
        let text = r#"{"nbformat":4,"cells":[],"metadata":{"z":1,"a":2}}"#;
        let doc: Value = serde_json::from_str(text).unwrap();
        let out = String::from_utf8(to_json_bytes(&doc, b"").unwrap()).unwrap();
        let compact: String = out.chars().filter(|c| *c != '\n').collect();
        assert_eq!(compact, r#"{"nbformat": 4,"cells": [],"metadata": {"z": 1,"a": 2}}"#);
    }

    #[test]
    fn test_atomic_write_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nb.ipynb");
        fs::write(&path, "old").unwrap();

        write_document_atomic(&path, &json!({ "cells": [] }), NOTEBOOK_INDENT).unwrap();

        assert_eq!(load_document(&path).unwrap(), json!({ "cells": [] }));
        // Only the notebook itself remains; the temp file was renamed into place.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_write_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nb.ipynb");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_document_atomic(&path, &json!({ "cells": [] }), NOTEBOOK_INDENT).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_write_follows_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.ipynb");
        let link = dir.path().join("link.ipynb");
        fs::write(&real, "{}").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        write_document_atomic(&link, &json!({ "cells": [] }), NOTEBOOK_INDENT).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(load_document(&real).unwrap(), json!({ "cells": [] }));
    }

    #[test]
    fn test_large_numbers_roundtrip_exactly() {
        let text = r#"{"n":123456789012345678901234567890,"x":0.1000000000000000055511151231257827}"#;
        let doc: Value = serde_json::from_str(text).unwrap();

        let out = String::from_utf8(to_json_bytes(&doc, b"").unwrap()).unwrap();

        assert!(out.contains("\"n\": 123456789012345678901234567890"));
        assert!(out.contains("\"x\": 0.1000000000000000055511151231257827"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_document(&dir.path().join("absent.ipynb")).unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }

    #[test]
    fn test_load_malformed_json_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ipynb");
        fs::write(&path, "{ \"cells\": [").unwrap();
        assert!(matches!(load_document(&path).unwrap_err(), StorageError::Json(_)));
    }
}
