//! Pre-migration backups.
//!
//! The backup lives next to the notebook with `.bak` appended to the full file
//! name, so `analysis.ipynb` is backed up to `analysis.ipynb.bak`. It is written
//! with 2-space indentation and synced before any migration starts.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::file_storage::{write_document_synced, Result, BACKUP_INDENT};

const BACKUP_SUFFIX: &str = ".bak";

/// Get the backup path for a notebook
pub fn backup_path_for(notebook_path: &Path) -> PathBuf {
    let mut name: OsString = notebook_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(BACKUP_SUFFIX);
    notebook_path.with_file_name(name)
}

/// Write the document as read to its backup path. Overwrites any previous backup.
pub fn write_backup(notebook_path: &Path, document: &Value) -> Result<PathBuf> {
    let backup_path = backup_path_for(notebook_path);
    if backup_path.exists() {
        log::warn!("Backup: overwriting existing backup at {:?}", backup_path);
    }
    write_document_synced(&backup_path, document, BACKUP_INDENT)?;
    log::debug!("Backup: wrote {:?}", backup_path);
    Ok(backup_path)
}
