//! Acquisition quality scoring for batches of grayscale medical images.
//!
//! The library turns per-image raw metrics (blur, brightness, contrast, entropy) into a
//! batch-relative Acquisition Quality Index, quartile tags and boundary-ambiguity flags.
//! Supporting stages measure the raw metrics from image files and interpret an
//! externally produced clustering table.

// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod extraction;
pub mod formatting;
pub mod interpretation;
pub mod io;
pub mod observability;
pub mod scoring;

// Re-export commonly used types
pub use crate::core::{Metric, MetricRecord, MinMax, Quartiles, Tag};

pub use crate::config::{AqimapConfig, DegeneratePolicy, ScoringWeights};

pub use crate::errors::{Error, Result};

pub use crate::scoring::{
    compute_aqi, compute_quantiles, derive_flags, normalize, quantile, score_batch, tag,
    BatchStatistics, BatchSummary, EngineConfig, ScoredBatch, ScoredImage,
};

pub use crate::extraction::{extract_directory, ExtractionOutcome};

pub use crate::interpretation::{
    cluster_stability, distance_outliers, interpret, interpret_table, ClusterStability, Verdict,
};

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};
