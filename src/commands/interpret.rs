use crate::config::resolve_config;
use crate::interpretation::interpret_table;
use crate::io::{
    ensure_dir, read_cluster_table_file, tables::create_in, write_ambiguous,
    write_interpretations, write_stability,
};
use crate::observability::{set_phase, ScoringPhase};
use anyhow::{Context, Result};
use std::path::PathBuf;

pub const STABILITY_FILE: &str = "cluster_stability_metrics.csv";
pub const INTERPRETATION_FILE: &str = "ai_cluster_interpretation.csv";
pub const AMBIGUOUS_FILE: &str = "ambiguous_images.csv";

pub struct InterpretConfig {
    pub input: PathBuf,
    pub cluster_column: Option<String>,
    pub output_dir: PathBuf,
    pub outlier_quantile: Option<f64>,
    pub config: Option<PathBuf>,
}

pub fn interpret_clusters(config: InterpretConfig) -> Result<()> {
    let aqimap_config = resolve_config(config.config.as_deref())?;
    let mut thresholds = aqimap_config.interpretation();
    if let Some(q) = config.outlier_quantile {
        thresholds.outlier_quantile = q;
    }

    let table = read_cluster_table_file(&config.input, config.cluster_column.as_deref())
        .with_context(|| format!("Failed to read clustering table {}", config.input.display()))?;
    let report = interpret_table(&table, &thresholds)?;

    let _phase = set_phase(ScoringPhase::Output);
    ensure_dir(&config.output_dir)?;
    write_stability(
        create_in(&config.output_dir, STABILITY_FILE)?,
        &report.cluster_column,
        &report.stability,
    )?;
    write_interpretations(
        create_in(&config.output_dir, INTERPRETATION_FILE)?,
        &report.cluster_column,
        &report.interpretations,
    )?;
    write_ambiguous(
        create_in(&config.output_dir, AMBIGUOUS_FILE)?,
        &table,
        &report.outliers,
    )?;

    println!("Cluster interpretation (column '{}'):", report.cluster_column);
    for i in &report.interpretations {
        let stability = i
            .stability_score
            .map(|s| format!("{:.3}", s))
            .unwrap_or_else(|| "n/a".to_string());
        println!("  Cluster {}: stability {} - {}", i.cluster, stability, i.verdict);
    }
    println!(
        "{} ambiguous images (distance > {:.4}), tables written to {}",
        report.outliers.len(),
        report.outlier_threshold,
        config.output_dir.display()
    );
    Ok(())
}
