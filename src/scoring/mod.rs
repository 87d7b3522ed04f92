//! Acquisition Quality Index and ambiguity scoring.

pub mod batch;
pub mod engine;
pub mod normalize;
pub mod quantile;
pub mod tagging;

pub use batch::MetricBatch;
pub use engine::{
    compute_aqi, score_batch, score_validated, BatchStatistics, BatchSummary, ColumnStatistics,
    EngineConfig, Range, ScoredBatch, ScoredImage, TagCounts,
};
pub use normalize::{normalize, normalize_column};
pub use quantile::{compute_quantiles, quantile, quantile_sorted, Q1, Q3};
pub use tagging::{ambiguity, derive_flags, mean_ambiguity, tag, ImageFlags};
