use std::path::{Path, PathBuf};

/// File name of the notebook migrated when no path is given.
pub const DEFAULT_NOTEBOOK_NAME: &str = "new_analysis.ipynb";

/// Resolve the default notebook location relative to `anchor`, normally the
/// running executable: two directories up, then [`DEFAULT_NOTEBOOK_NAME`].
///
/// Anchors too shallow to climb two levels resolve against the filesystem root
/// (or the current directory for relative anchors).
pub fn default_notebook_path(anchor: &Path) -> PathBuf {
    let base = anchor
        .ancestors()
        .nth(2)
        .unwrap_or_else(|| anchor.ancestors().last().unwrap_or(Path::new("")));
    base.join(DEFAULT_NOTEBOOK_NAME)
}

/// Default notebook path for the current executable.
pub fn default_notebook_path_for_exe() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let exe = exe.canonicalize().unwrap_or(exe);
    Ok(default_notebook_path(&exe))
}
