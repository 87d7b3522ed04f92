use crate::config::resolve_config;
use crate::extraction::extract_directory;
use crate::io::write_metrics_file;
use crate::observability::{set_phase, ScoringPhase};
use anyhow::{Context, Result};
use std::path::PathBuf;

pub struct ExtractConfig {
    pub dir: PathBuf,
    pub output: PathBuf,
    pub show_progress: bool,
    pub config: Option<PathBuf>,
}

pub fn extract_metrics(config: ExtractConfig) -> Result<()> {
    let aqimap_config = resolve_config(config.config.as_deref())?;

    let outcome = extract_directory(&config.dir, &aqimap_config.extraction(), config.show_progress)
        .with_context(|| format!("Failed to extract metrics from {}", config.dir.display()))?;

    {
        let _phase = set_phase(ScoringPhase::Output);
        write_metrics_file(&config.output, &outcome.records)
            .with_context(|| format!("Failed to write {}", config.output.display()))?;
    }

    println!(
        "Measured {} images, wrote {}",
        outcome.records.len(),
        config.output.display()
    );
    if !outcome.skipped.is_empty() {
        eprintln!("Skipped {} unreadable files", outcome.skipped.len());
    }
    Ok(())
}
