//! CLI command implementations for aqimap.
//!
//! Available commands:
//! - **extract**: Measure raw acquisition metrics for a directory of images
//! - **score**: Score a metrics table and write the tagged table, subsets and report
//! - **interpret**: Summarize cluster stability and distance outliers
//! - **init**: Initialize a new aqimap configuration file

pub mod extract;
pub mod init;
pub mod interpret;
pub mod score;

pub use extract::{extract_metrics, ExtractConfig};
pub use init::init_config;
pub use interpret::{interpret_clusters, InterpretConfig};
pub use score::{score_metrics, ScoreConfig};
