// Test utility module for aqimap integration tests
#![allow(dead_code)]

use aqimap::MetricRecord;
use image::{GrayImage, Luma};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Build records from `(image, [blur, brightness, contrast, entropy])` rows
pub fn records(rows: &[(&str, [f64; 4])]) -> Vec<MetricRecord> {
    rows.iter()
        .map(|(id, [b, br, c, e])| MetricRecord::new(*id, *b, *br, *c, *e))
        .collect()
}

/// Records whose four metrics vary independently so no column is constant
pub fn spread_records(n: usize) -> Vec<MetricRecord> {
    (0..n)
        .map(|i| {
            let x = i as f64;
            MetricRecord::new(
                format!("img_{i:03}.png"),
                10.0 + (x * 7.0) % 50.0,
                90.0 + (x * 3.0) % 40.0,
                20.0 + (x * 11.0) % 30.0,
                4.0 + (x * 0.37) % 3.0,
            )
        })
        .collect()
}

pub fn write_metrics_csv(dir: &Path, name: &str, records: &[MetricRecord]) -> PathBuf {
    let path = dir.join(name);
    aqimap::io::write_metrics_file(&path, records).expect("Failed to write metrics fixture");
    path
}

pub fn write_gray_png(dir: &Path, name: &str, img: &GrayImage) -> PathBuf {
    let path = dir.join(name);
    img.save(&path).expect("Failed to write image fixture");
    path
}

pub fn checkerboard(size: u32, low: u8, high: u8) -> GrayImage {
    GrayImage::from_fn(size, size, |x, y| {
        if (x + y) % 2 == 0 {
            Luma([high])
        } else {
            Luma([low])
        }
    })
}

/// The aqimap binary, isolated from any `.aqimap.toml` above the test directory
pub fn aqimap(cwd: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_aqimap"));
    cmd.current_dir(cwd).env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

/// Parse a CSV file into a header and rows of strings
pub fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut rdr = csv::Reader::from_path(path).expect("Failed to open CSV");
    let header = rdr
        .headers()
        .expect("Missing header")
        .iter()
        .map(String::from)
        .collect();
    let rows = rdr
        .records()
        .map(|r| r.expect("Bad record").iter().map(String::from).collect())
        .collect();
    (header, rows)
}
