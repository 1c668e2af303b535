//! Scratch locations for tests that write files.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a fresh scratch directory, removed when the returned guard drops.
pub fn scratch_dir() -> anyhow::Result<TempDir> {
    Ok(tempfile::Builder::new().prefix("gwpp-test-").tempdir()?)
}

/// Write `bytes` to `dir/name` and return the full path.
pub fn write_scratch_file(dir: &Path, name: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, bytes)?;
    Ok(path)
}
