//! Phase 1: a validated batch of raw metric records.

use crate::core::{Metric, MetricRecord};
use crate::errors::{Error, Result};
use std::collections::HashSet;

/// A non-empty batch whose metrics are all finite and whose image ids are unique.
///
/// A single bad record rejects the whole batch, so no statistic is ever computed
/// from partially valid data.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricBatch {
    records: Vec<MetricRecord>,
}

impl MetricBatch {
    pub fn new(records: Vec<MetricRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::EmptyBatch);
        }

        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            validate_record(record)?;
            if !seen.insert(record.image_id.as_str()) {
                return Err(Error::invalid_record(
                    record.image_id.clone(),
                    "duplicate image id",
                ));
            }
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a constructed batch
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of one metric in record order
    pub fn column(&self, metric: Metric) -> Vec<f64> {
        self.records.iter().map(|r| r.value(metric)).collect()
    }

    /// All four columns in [`Metric::ALL`] order
    pub fn columns(&self) -> [Vec<f64>; 4] {
        Metric::ALL.map(|m| self.column(m))
    }

    pub fn into_records(self) -> Vec<MetricRecord> {
        self.records
    }
}

fn validate_record(record: &MetricRecord) -> Result<()> {
    if record.image_id.trim().is_empty() {
        return Err(Error::invalid_record("", "empty image id"));
    }

    for metric in Metric::ALL {
        let value = record.value(metric);
        if !value.is_finite() {
            return Err(Error::invalid_metric(
                record.image_id.clone(),
                metric,
                format!("value is not finite ({})", value),
            ));
        }
    }
    Ok(())
}
