use crate::config::{resolve_config, DegeneratePolicy};
use crate::formatting::FormattingConfig;
use crate::io::{
    create_writer, read_metrics_file, write_scored_file, write_subsets, OutputFormat, Report,
};
use crate::observability::{set_phase, ScoringPhase};
use crate::scoring::{score_batch, ScoredBatch};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct ScoreConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub split_dir: Option<PathBuf>,
    pub format: OutputFormat,
    pub report: Option<PathBuf>,
    pub degenerate_columns: Option<DegeneratePolicy>,
    pub config: Option<PathBuf>,
}

pub fn score_metrics(config: ScoreConfig) -> Result<ScoredBatch> {
    let aqimap_config = resolve_config(config.config.as_deref())?;
    let mut engine_config = aqimap_config.engine_config();
    if let Some(policy) = config.degenerate_columns {
        engine_config.degenerate_columns = policy;
    }

    let records = read_metrics_file(&config.input)
        .with_context(|| format!("Failed to read metrics from {}", config.input.display()))?;
    let batch = score_batch(records, &engine_config).context("Failed to score batch")?;

    write_outputs(&config, &batch)?;
    write_report(config.format, config.report.as_deref(), &Report::new(&batch))?;
    Ok(batch)
}

fn write_outputs(config: &ScoreConfig, batch: &ScoredBatch) -> Result<()> {
    let _phase = set_phase(ScoringPhase::Output);

    write_scored_file(&config.output, &batch.images)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;
    log::info!("Wrote {} scored images to {}", batch.len(), config.output.display());

    if let Some(dir) = &config.split_dir {
        for (subset, path, rows) in write_subsets(dir, batch)
            .with_context(|| format!("Failed to write subsets into {}", dir.display()))?
        {
            log::info!("{:?}: {} rows -> {}", subset, rows, path.display());
        }
    }
    Ok(())
}

fn write_report(format: OutputFormat, report_path: Option<&Path>, report: &Report) -> Result<()> {
    let sink: Box<dyn Write> = match report_path {
        Some(path) => {
            FormattingConfig::plain().apply();
            crate::io::ensure_parent(path)?;
            let file = File::create(path)
                .with_context(|| format!("Failed to create report {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => {
            FormattingConfig::from_env().apply();
            Box::new(std::io::stdout())
        }
    };

    let mut writer = create_writer(format, sink);
    writer.write_report(report)
}
