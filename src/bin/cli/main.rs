mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use cellid_migrate::paths;
use cellid_migrate::storage::{IdGenerator, MigrateOptions, SequentialIds, UuidGenerator};

#[derive(Parser)]
#[command(
    name = "cellid-migrate",
    about = "Move notebook cell ids into cell metadata",
    version
)]
struct Cli {
    /// Notebook to migrate (default: new_analysis.ipynb two directories above this executable)
    notebook: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "plain")]
    format: OutputFormat,

    /// Report what would change without writing the backup or the notebook
    #[arg(long)]
    dry_run: bool,

    /// Generate `<PREFIX>-1`, `<PREFIX>-2`, ... instead of random UUIDs
    #[arg(long, value_name = "PREFIX")]
    seed_prefix: Option<String>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let notebook = match cli.notebook {
        Some(path) => path,
        None => paths::default_notebook_path_for_exe()
            .context("Failed to resolve default notebook path")?,
    };

    let mut ids: Box<dyn IdGenerator> = match cli.seed_prefix {
        Some(prefix) => Box::new(SequentialIds::new(prefix)),
        None => Box::new(UuidGenerator),
    };

    let options = MigrateOptions {
        dry_run: cli.dry_run,
    };

    commands::migrate::run(&notebook, ids.as_mut(), &options, &cli.format)
}
