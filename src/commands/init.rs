use crate::config::CONFIG_FILE_NAME;
use crate::io;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG: &str = r#"# aqimap configuration

# AQI weights. Each must lie in [0, 1] and together they must sum to 1.0.
[scoring]
blur = 0.3
brightness = 0.2
contrast = 0.3
entropy = 0.2

# Columns whose values are all equal: "zero" maps them to 0.0 and warns,
# "error" rejects the batch.
[normalization]
degenerate_columns = "zero"

[interpretation]
stable_threshold = 0.7
moderate_threshold = 0.4
outlier_quantile = 0.95

[extraction]
extensions = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"]
"#;

/// Write the default configuration into `dir`, returning the file path.
pub fn init_config_in(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    io::write_file(&config_path, DEFAULT_CONFIG)?;
    Ok(config_path)
}

pub fn init_config(force: bool) -> Result<()> {
    init_config_in(Path::new("."), force)?;
    println!("Created {} configuration file", CONFIG_FILE_NAME);
    Ok(())
}
