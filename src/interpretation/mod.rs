//! Cluster stability and distance-outlier interpretation.
//!
//! Consumes the table written by an external clustering stage: one row per image
//! with a cluster id column and the image's `cluster_distance` to its centroid.
//! Nothing here clusters or projects embeddings.

use crate::config::InterpretationConfig;
use crate::errors::{Error, Result};
use crate::observability::{set_phase, ScoringPhase};
use crate::scoring::quantile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Cluster id columns tried in order when none is given explicitly
pub const CLUSTER_COLUMN_CANDIDATES: [&str; 6] = [
    "cluster",
    "kmeans_cluster",
    "dbscan_cluster",
    "hierarchical_cluster",
    "final_cluster",
    "cluster_label",
];

pub const DISTANCE_COLUMN: &str = "cluster_distance";

/// One row of the clustering table. `fields` keeps the original cells for re-export.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterRow {
    pub image: Option<String>,
    pub cluster: i64,
    pub distance: f64,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterTable {
    pub headers: Vec<String>,
    pub cluster_column: String,
    pub rows: Vec<ClusterRow>,
}

/// Pick the cluster id column: the explicit choice, else the first known candidate present.
pub fn detect_cluster_column(headers: &[String], explicit: Option<&str>) -> Result<String> {
    if let Some(name) = explicit {
        return if headers.iter().any(|h| h == name) {
            Ok(name.to_string())
        } else {
            Err(Error::Input(format!(
                "cluster column '{}' not found in table",
                name
            )))
        };
    }

    CLUSTER_COLUMN_CANDIDATES
        .iter()
        .find(|candidate| headers.iter().any(|h| h == *candidate))
        .map(|c| c.to_string())
        .ok_or_else(|| {
            Error::Input(format!(
                "no cluster column found, expected one of: {}",
                CLUSTER_COLUMN_CANDIDATES.join(", ")
            ))
        })
}

/// Compactness of one cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStability {
    pub cluster: i64,
    pub mean: f64,
    /// Sample standard deviation; undefined for single-member clusters
    pub std: Option<f64>,
    pub count: usize,
    /// `1 / (1 + std)`
    pub stability_score: Option<f64>,
}

/// Group distances by cluster id (ascending) and measure their spread.
pub fn cluster_stability(rows: &[ClusterRow]) -> Vec<ClusterStability> {
    let mut groups: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.cluster).or_default().push(row.distance);
    }

    groups
        .into_iter()
        .map(|(cluster, distances)| {
            let count = distances.len();
            let mean = distances.iter().sum::<f64>() / count as f64;
            let std = sample_std(&distances, mean);
            ClusterStability {
                cluster,
                mean,
                std,
                count,
                stability_score: std.map(|s| 1.0 / (1.0 + s)),
            }
        })
        .collect()
}

fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    HighlyStable,
    ModeratelyStable,
    Unstable,
}

impl Verdict {
    pub fn description(&self) -> &'static str {
        match self {
            Verdict::HighlyStable => "Highly stable cluster - consistent, high-confidence images",
            Verdict::ModeratelyStable => "Moderately stable cluster - contains ambiguous samples",
            Verdict::Unstable => "Unstable cluster - likely poor-quality or outlier images",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Thresholds are exclusive; an undefined stability is unstable.
pub fn interpret(stability_score: Option<f64>, config: &InterpretationConfig) -> Verdict {
    match stability_score {
        Some(s) if s > config.stable_threshold => Verdict::HighlyStable,
        Some(s) if s > config.moderate_threshold => Verdict::ModeratelyStable,
        _ => Verdict::Unstable,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterInterpretation {
    pub cluster: i64,
    pub mean_distance: f64,
    pub std_distance: Option<f64>,
    pub stability_score: Option<f64>,
    pub verdict: Verdict,
}

pub fn interpret_clusters(
    stability: &[ClusterStability],
    config: &InterpretationConfig,
) -> Vec<ClusterInterpretation> {
    stability
        .iter()
        .map(|s| ClusterInterpretation {
            cluster: s.cluster,
            mean_distance: s.mean,
            std_distance: s.std,
            stability_score: s.stability_score,
            verdict: interpret(s.stability_score, config),
        })
        .collect()
}

/// Rows whose distance is strictly above the `q` quantile of all distances.
///
/// Returns the threshold and the indices of the flagged rows in table order.
pub fn distance_outliers(rows: &[ClusterRow], q: f64) -> Result<(f64, Vec<usize>)> {
    let distances: Vec<f64> = rows.iter().map(|r| r.distance).collect();
    let threshold = quantile(&distances, q).ok_or(Error::EmptyBatch)?;
    let flagged = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| r.distance > threshold)
        .map(|(i, _)| i)
        .collect();
    Ok((threshold, flagged))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretationReport {
    pub cluster_column: String,
    pub stability: Vec<ClusterStability>,
    pub interpretations: Vec<ClusterInterpretation>,
    pub outlier_threshold: f64,
    /// Row indices of the ambiguous images
    pub outliers: Vec<usize>,
}

pub fn interpret_table(
    table: &ClusterTable,
    config: &InterpretationConfig,
) -> Result<InterpretationReport> {
    let _phase = set_phase(ScoringPhase::Interpretation);

    if table.rows.is_empty() {
        return Err(Error::EmptyBatch);
    }
    config.validate().map_err(Error::Configuration)?;

    let stability = cluster_stability(&table.rows);
    let interpretations = interpret_clusters(&stability, config);
    let (outlier_threshold, outliers) = distance_outliers(&table.rows, config.outlier_quantile)?;

    tracing::info!(
        clusters = stability.len(),
        ambiguous = outliers.len(),
        threshold = outlier_threshold,
        "interpreted clustering table"
    );

    Ok(InterpretationReport {
        cluster_column: table.cluster_column.clone(),
        stability,
        interpretations,
        outlier_threshold,
        outliers,
    })
}
