//! Shared error types for aqimap.
//!
//! Scoring is pure computation, so every error here is surfaced synchronously to the
//! caller and nothing is retried. Validation errors (`EmptyBatch`, `InvalidInput`) are
//! raised before any batch statistic is computed.

use crate::core::Metric;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for aqimap operations
#[derive(Debug, Error)]
pub enum Error {
    /// The batch contained no images
    #[error("Empty batch: at least one image is required")]
    EmptyBatch,

    /// A metric value was missing, non-finite, or the image key was duplicated
    #[error("Invalid input for image '{image}'{}: {reason}", metric_suffix(.metric))]
    InvalidInput {
        image: String,
        metric: Option<Metric>,
        reason: String,
    },

    /// A metric column has zero variance and the policy forbids the zero fallback
    #[error("Degenerate column: '{metric}' has zero variance across the batch")]
    DegenerateColumn { metric: Metric },

    /// Malformed input tables (missing columns, unparsable ids)
    #[error("Input error: {0}")]
    Input(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File system related errors
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// CSV errors
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Image decoding errors
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

fn metric_suffix(metric: &Option<Metric>) -> String {
    metric
        .map(|m| format!(" (metric '{}')", m))
        .unwrap_or_default()
}

impl Error {
    /// Create an invalid-input error for a specific metric of an image
    pub fn invalid_metric(image: impl Into<String>, metric: Metric, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            image: image.into(),
            metric: Some(metric),
            reason: reason.into(),
        }
    }

    /// Create an invalid-input error that concerns the whole record
    pub fn invalid_record(image: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            image: image.into(),
            metric: None,
            reason: reason.into(),
        }
    }

    /// Create a file system error with path context
    pub fn file_system(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_metric_message_names_image_and_metric() {
        let err = Error::invalid_metric("img_001.png", Metric::Blur, "value is NaN");
        assert_eq!(
            err.to_string(),
            "Invalid input for image 'img_001.png' (metric 'blur'): value is NaN"
        );
    }

    #[test]
    fn test_invalid_record_message_omits_metric() {
        let err = Error::invalid_record("a.png", "duplicate image id");
        assert_eq!(err.to_string(), "Invalid input for image 'a.png': duplicate image id");
    }
}
