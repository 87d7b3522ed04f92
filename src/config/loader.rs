use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::core::AqimapConfig;
use super::scoring::ScoringWeights;
use crate::errors::{Error, Result};

/// File name searched for in the working directory and its ancestors
pub const CONFIG_FILE_NAME: &str = ".aqimap.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Pure function to read config file contents
pub(crate) fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

fn parse_config(contents: &str) -> std::result::Result<AqimapConfig, String> {
    toml::from_str::<AqimapConfig>(contents)
        .map_err(|e| format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e))
}

/// Parse config and reject invalid sections
pub fn parse_config_strict(contents: &str) -> std::result::Result<AqimapConfig, String> {
    let mut config = parse_config(contents)?;

    if let Some(ref mut scoring) = config.scoring {
        scoring.validate()?;
        scoring.normalize();
    }
    if let Some(ref interpretation) = config.interpretation {
        interpretation.validate()?;
    }

    Ok(config)
}

/// Parse config, replacing invalid sections with their defaults
pub fn parse_and_validate_config(contents: &str) -> std::result::Result<AqimapConfig, String> {
    let mut config = parse_config(contents)?;

    if let Some(ref mut scoring) = config.scoring {
        if let Err(e) = scoring.validate() {
            log::warn!("Invalid scoring weights: {}. Using defaults.", e);
            config.scoring = Some(ScoringWeights::default());
        } else {
            scoring.normalize(); // Ensure exact sum of 1.0
        }
    }

    if let Some(ref interpretation) = config.interpretation {
        if let Err(e) = interpretation.validate() {
            log::warn!("Invalid interpretation thresholds: {}. Using defaults.", e);
            config.interpretation = None;
        }
    }

    Ok(config)
}

/// Load an explicitly requested config file; any failure is an error
pub fn load_config_from(path: &Path) -> Result<AqimapConfig> {
    let contents = read_config_file(path)
        .map_err(|e| Error::file_system("Failed to read config file", path, e))?;
    let config = parse_config_strict(&contents)
        .map_err(|e| Error::Configuration(format!("{} ({})", e, path.display())))?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Pure function to try loading config from a specific path
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<AqimapConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            None
        }
    }
}

/// Handle file read errors with appropriate logging
pub(crate) fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// Pure function to generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for `.aqimap.toml`
pub fn discover_config(start: PathBuf) -> AqimapConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            AqimapConfig::default()
        })
}

pub fn load_config() -> AqimapConfig {
    match std::env::current_dir() {
        Ok(dir) => discover_config(dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            AqimapConfig::default()
        }
    }
}

/// Explicit path if given, otherwise discovery from the working directory
pub fn resolve_config(explicit: Option<&Path>) -> Result<AqimapConfig> {
    match explicit {
        Some(path) => load_config_from(path),
        None => Ok(load_config()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lenient_parse_replaces_invalid_weights() {
        let config = parse_and_validate_config("[scoring]\nblur = 0.9\n").unwrap();
        assert_eq!(config.weights(), ScoringWeights::default());
    }

    #[test]
    fn test_strict_parse_rejects_invalid_weights() {
        let err = parse_config_strict("[scoring]\nblur = 0.9\n").unwrap_err();
        assert!(err.contains("must sum to 1.0"), "{}", err);
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(parse_and_validate_config("[scoring\n").is_err());
    }

    #[test]
    fn test_directory_ancestors_walks_up() {
        let dirs: Vec<_> = directory_ancestors(PathBuf::from("/a/b/c"), 10).collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/a/b/c"),
                PathBuf::from("/a/b"),
                PathBuf::from("/a"),
                PathBuf::from("/"),
            ]
        );
    }

    #[test]
    fn test_discover_config_from_parent_directory() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("batch").join("run1");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "[normalization]\ndegenerate_columns = \"error\"\n",
        )
        .unwrap();

        let config = discover_config(nested);
        assert_eq!(
            config.degenerate_policy(),
            crate::config::DegeneratePolicy::Error
        );
    }

    #[test]
    fn test_load_config_from_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let result = load_config_from(&temp.path().join("missing.toml"));
        assert!(matches!(result, Err(Error::FileSystem { .. })));
    }
}
