//! Raw metric extraction from a directory of images.
//!
//! Discovery is non-recursive and sorted by file name so the produced table is
//! reproducible. Images are decoded and measured in parallel; a file that fails to
//! decode is skipped with a warning rather than failing the batch.

pub mod metrics;

pub use metrics::{laplacian_variance, mean_and_std, shannon_entropy, ImageMetrics};

use crate::config::ExtractionConfig;
use crate::core::MetricRecord;
use crate::errors::{Error, Result};
use crate::observability::{
    increment_processed, reset_progress, set_current_image, set_phase, set_progress, ScoringPhase,
};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const TEMPLATE_EXTRACTION: &str = "{msg} {pos}/{len} images ({percent}%) - {eta}";

/// An image that could not be measured
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome {
    pub records: Vec<MetricRecord>,
    pub skipped: Vec<SkippedImage>,
}

/// List the image files directly inside `dir`, sorted by file name.
pub fn discover_images(dir: &Path, config: &ExtractionConfig) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::Input(format!(
            "'{}' is not a directory",
            dir.display()
        )));
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::FileSystem {
            message: format!("failed to read directory entry: {}", e),
            path: e.path().map(Path::to_path_buf),
            source: None,
        })?;

        let accepted = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| config.accepts_extension(ext));
        if accepted {
            images.push(entry.into_path());
        }
    }
    Ok(images)
}

/// Image identifier used in output tables: the bare file name.
pub fn image_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Decode one image as 8-bit grayscale and measure it.
pub fn extract_image(path: &Path) -> Result<MetricRecord> {
    let gray = image::open(path)?.to_luma8();
    let m = ImageMetrics::compute(&gray);
    Ok(MetricRecord::new(
        image_id(path),
        m.blur,
        m.brightness,
        m.contrast,
        m.entropy,
    ))
}

fn progress_bar(len: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(TEMPLATE_EXTRACTION)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░  "),
    );
    pb.set_message("Extracting metrics");
    pb
}

/// Measure every supported image in `dir`.
///
/// Output order matches discovery order regardless of worker scheduling.
pub fn extract_directory(
    dir: &Path,
    config: &ExtractionConfig,
    show_progress: bool,
) -> Result<ExtractionOutcome> {
    let _phase = set_phase(ScoringPhase::Extraction);

    let paths = discover_images(dir, config)?;
    if paths.is_empty() {
        return Err(Error::EmptyBatch);
    }
    tracing::info!(count = paths.len(), dir = %dir.display(), "discovered images");

    set_progress(0, paths.len());
    let pb = progress_bar(paths.len(), show_progress);
    let results: Vec<(PathBuf, Result<MetricRecord>)> = paths
        .into_par_iter()
        .progress_with(pb.clone())
        .map(|path| {
            let _image = set_current_image(image_id(&path));
            let result = extract_image(&path);
            increment_processed();
            (path, result)
        })
        .collect();
    pb.finish_and_clear();
    reset_progress();

    let mut records = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();
    for (path, result) in results {
        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable image");
                skipped.push(SkippedImage {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    if records.is_empty() {
        return Err(Error::EmptyBatch);
    }

    Ok(ExtractionOutcome { records, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::fs;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, value: u8) {
        GrayImage::from_pixel(4, 4, Luma([value]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_discovery_is_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        write_png(temp.path(), "b.png", 10);
        write_png(temp.path(), "a.PNG", 20);
        fs::write(temp.path().join("notes.txt"), "not an image").unwrap();
        fs::create_dir(temp.path().join("nested.png")).unwrap();

        let found = discover_images(temp.path(), &ExtractionConfig::default()).unwrap();
        let names: Vec<String> = found.iter().map(|p| image_id(p)).collect();
        assert_eq!(names, vec!["a.PNG", "b.png"]);
    }

    #[test]
    fn test_extract_directory_skips_corrupt_files() {
        let temp = TempDir::new().unwrap();
        write_png(temp.path(), "dark.png", 10);
        write_png(temp.path(), "light.png", 200);
        fs::write(temp.path().join("broken.jpg"), b"not really a jpeg").unwrap();

        let outcome =
            extract_directory(temp.path(), &ExtractionConfig::default(), false).unwrap();

        let ids: Vec<&str> = outcome.records.iter().map(|r| r.image_id.as_str()).collect();
        assert_eq!(ids, vec!["dark.png", "light.png"]);
        assert_eq!(outcome.records[1].brightness, 200.0);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].path.ends_with("broken.jpg"));
    }

    #[test]
    fn test_empty_directory_is_empty_batch() {
        let temp = TempDir::new().unwrap();
        let result = extract_directory(temp.path(), &ExtractionConfig::default(), false);
        assert!(matches!(result, Err(Error::EmptyBatch)));
    }

    #[test]
    fn test_missing_directory_is_input_error() {
        let result = discover_images(Path::new("/nonexistent/aqimap"), &ExtractionConfig::default());
        assert!(matches!(result, Err(Error::Input(_))));
    }
}
