use std::path::Path;

use anyhow::{Context, Result};

use cellid_migrate::storage::{run_migration_with, IdGenerator, MigrateOptions};

use crate::OutputFormat;

pub fn run(
    notebook: &Path,
    ids: &mut dyn IdGenerator,
    options: &MigrateOptions,
    format: &OutputFormat,
) -> Result<()> {
    let plain = matches!(format, OutputFormat::Plain);
    if plain {
        println!("Notebook: {}", notebook.display());
    }

    // Printed before migrating so the backup location is known even if migration fails.
    let report = run_migration_with(notebook, ids, options, |backup| {
        if plain {
            println!("Backup written to {}", backup.display());
        }
    })
    .with_context(|| format!("Failed to migrate notebook {}", notebook.display()))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Plain => {
            if report.dry_run {
                println!("Dry run: no backup written");
                println!("Cells that would be updated: {}", report.cells_changed());
            } else {
                println!("Updated notebook written. Cells updated: {}", report.cells_changed());
            }
        }
    }

    Ok(())
}
