//! One-time migration of cell identifiers into `metadata.id`.
//!
//! Older notebooks keep each cell's identifier at the cell's top level. The
//! identifier now lives in the cell's `metadata` object. For every cell:
//!
//! - the top-level `id` is always removed;
//! - an existing `metadata.id` is left untouched;
//! - otherwise the top-level value is moved into `metadata.id`, or a new one is generated.
//!
//! Running the migration on an already-migrated notebook changes nothing.

use std::path::Path;

use serde_json::{Map, Value};

use super::backup::write_backup;
use super::file_storage::{
    load_document, write_document_atomic, Result, StorageError, NOTEBOOK_INDENT,
};
use super::ids::IdGenerator;
use super::models::{
    CellOutcome, MigrateOptions, MigrationReport, MigrationStats, CELLS_KEY, ID_KEY, METADATA_KEY,
};

/// Migrate an owned document, returning it together with the number of changed cells.
pub fn migrate(mut document: Value, ids: &mut dyn IdGenerator) -> Result<(Value, usize)> {
    let stats = migrate_document(&mut document, ids)?;
    Ok((document, stats.changed()))
}

/// Migrate every cell of `document` in place.
///
/// The whole document is checked before any cell is touched, so a schema error
/// leaves `document` unmodified.
pub fn migrate_document(document: &mut Value, ids: &mut dyn IdGenerator) -> Result<MigrationStats> {
    validate_document(document)?;

    let mut stats = MigrationStats::default();
    for (index, cell) in cells_mut(document)?.iter_mut().enumerate() {
        let outcome = migrate_cell(index, cell, ids)?;
        log::debug!("Migration: cell {} -> {:?}", index, outcome);
        stats.record(outcome);
    }
    Ok(stats)
}

/// Load, back up, migrate and rewrite the notebook at `notebook_path`.
///
/// The backup is synced to disk before the document is migrated. The final
/// write replaces the notebook atomically.
pub fn run_migration(
    notebook_path: &Path,
    ids: &mut dyn IdGenerator,
    options: &MigrateOptions,
) -> Result<MigrationReport> {
    run_migration_with(notebook_path, ids, options, |_| {})
}

/// Like [`run_migration`], calling `on_backup` as soon as the backup is on disk
/// and before the document is migrated.
pub fn run_migration_with(
    notebook_path: &Path,
    ids: &mut dyn IdGenerator,
    options: &MigrateOptions,
    mut on_backup: impl FnMut(&Path),
) -> Result<MigrationReport> {
    let mut document = load_document(notebook_path)?;
    log::info!("Migration: loaded {:?}", notebook_path);

    let backup_path = if options.dry_run {
        None
    } else {
        let backup_path = write_backup(notebook_path, &document)?;
        on_backup(&backup_path);
        Some(backup_path)
    };

    let stats = migrate_document(&mut document, ids)?;

    if options.dry_run {
        log::info!("Migration: dry run, {:?} left unchanged", notebook_path);
    } else {
        write_document_atomic(notebook_path, &document, NOTEBOOK_INDENT)?;
        log::info!(
            "Migration: wrote {:?} ({} of {} cells changed)",
            notebook_path,
            stats.changed(),
            stats.total_cells
        );
    }

    Ok(MigrationReport {
        notebook_path: notebook_path.to_path_buf(),
        backup_path,
        stats,
        dry_run: options.dry_run,
    })
}

fn migrate_cell(index: usize, cell: &mut Value, ids: &mut dyn IdGenerator) -> Result<CellOutcome> {
    let cell = cell
        .as_object_mut()
        .ok_or_else(|| invalid(format!("cell {} is not an object", index)))?;

    // A null top-level id carries no identifier.
    let top_id = cell.shift_remove(ID_KEY).filter(|v| !v.is_null());

    let metadata = cell
        .entry(METADATA_KEY)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| invalid(format!("cell {} has non-object metadata", index)))?;

    if metadata.contains_key(ID_KEY) {
        return Ok(CellOutcome::Kept {
            dropped_top_level: top_id.is_some(),
        });
    }

    match top_id {
        Some(id) => {
            metadata.insert(ID_KEY.to_string(), id);
            Ok(CellOutcome::Moved)
        }
        None => {
            metadata.insert(ID_KEY.to_string(), Value::String(ids.next_id()));
            Ok(CellOutcome::Synthesized)
        }
    }
}

fn validate_document(document: &Value) -> Result<()> {
    let root = document
        .as_object()
        .ok_or_else(|| invalid("document root is not an object"))?;
    let cells = root
        .get(CELLS_KEY)
        .ok_or_else(|| invalid("missing \"cells\""))?
        .as_array()
        .ok_or_else(|| invalid("\"cells\" is not an array"))?;

    for (index, cell) in cells.iter().enumerate() {
        let cell = cell
            .as_object()
            .ok_or_else(|| invalid(format!("cell {} is not an object", index)))?;
        if let Some(metadata) = cell.get(METADATA_KEY) {
            if !metadata.is_object() {
                return Err(invalid(format!("cell {} has non-object metadata", index)));
            }
        }
    }
    Ok(())
}

fn cells_mut(document: &mut Value) -> Result<&mut Vec<Value>> {
    document
        .get_mut(CELLS_KEY)
        .and_then(Value::as_array_mut)
        .ok_or_else(|| invalid("\"cells\" is not an array"))
}

fn invalid(msg: impl Into<String>) -> StorageError {
    StorageError::InvalidDocument(msg.into())
}
