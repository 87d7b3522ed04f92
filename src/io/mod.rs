pub mod output;
pub mod tables;

pub use output::{
    create_writer, JsonWriter, MarkdownWriter, OutputFormat, OutputWriter, Report, TerminalWriter,
};
pub use tables::{
    read_cluster_table, read_cluster_table_file, read_metrics, read_metrics_file, write_ambiguous,
    write_interpretations, write_metrics, write_metrics_file, write_scored, write_scored_file,
    write_stability, write_subsets, Subset, SCORED_HEADER,
};

use crate::errors::{Error, Result};
use std::fs;
use std::path::Path;

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| Error::file_system("failed to write file", path, e))
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| Error::file_system("failed to create directory", path, e))?;
    }
    Ok(())
}

/// Create `path`'s parent directory if it has one.
pub fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}
