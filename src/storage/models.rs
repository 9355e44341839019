use std::path::PathBuf;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Document key holding the ordered cell list.
pub const CELLS_KEY: &str = "cells";

/// Cell key holding the per-cell metadata object.
pub const METADATA_KEY: &str = "metadata";

/// Identifier key, used both at the cell's top level (legacy) and inside `metadata`.
pub const ID_KEY: &str = "id";

/// What happened to a single cell during migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellOutcome {
    /// `metadata.id` already existed; any top-level id was dropped.
    Kept { dropped_top_level: bool },
    /// The top-level id was moved into `metadata.id`.
    Moved,
    /// A fresh identifier was generated.
    Synthesized,
}

/// Per-document tally of cell outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStats {
    pub total_cells: usize,
    pub moved: usize,
    pub synthesized: usize,
    pub dropped_top_level: usize,
}

impl MigrationStats {
    /// Cells whose `metadata.id` was written by this run.
    pub fn changed(&self) -> usize {
        self.moved + self.synthesized
    }

    pub(crate) fn record(&mut self, outcome: CellOutcome) {
        self.total_cells += 1;
        match outcome {
            CellOutcome::Kept { dropped_top_level } => {
                if dropped_top_level {
                    self.dropped_top_level += 1;
                }
            }
            CellOutcome::Moved => self.moved += 1,
            CellOutcome::Synthesized => self.synthesized += 1,
        }
    }
}

impl Serialize for MigrationStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MigrationStats", 5)?;
        state.serialize_field("cellsChanged", &self.changed())?;
        state.serialize_field("totalCells", &self.total_cells)?;
        state.serialize_field("moved", &self.moved)?;
        state.serialize_field("synthesized", &self.synthesized)?;
        state.serialize_field("droppedTopLevel", &self.dropped_top_level)?;
        state.end()
    }
}

/// Summary of a full file migration, printed by the CLI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub notebook_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
    #[serde(flatten)]
    pub stats: MigrationStats,
    pub dry_run: bool,
}

impl MigrationReport {
    pub fn cells_changed(&self) -> usize {
        self.stats.changed()
    }
}

/// Knobs for [`crate::storage::run_migration`].
#[derive(Debug, Clone, Default)]
pub struct MigrateOptions {
    /// Migrate in memory only; neither the backup nor the notebook is written.
    pub dry_run: bool,
}
