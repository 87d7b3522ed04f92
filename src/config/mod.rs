//! Configuration for aqimap, read from `.aqimap.toml`.

mod core;
mod loader;
mod scoring;

pub use self::core::{
    default_extensions, default_moderate_threshold, default_outlier_quantile,
    default_stable_threshold, AqimapConfig, ExtractionConfig, InterpretationConfig,
};
pub use loader::{
    directory_ancestors, discover_config, load_config, load_config_from, parse_and_validate_config,
    parse_config_strict, resolve_config, CONFIG_FILE_NAME,
};
pub use scoring::{
    default_blur_weight, default_brightness_weight, default_contrast_weight,
    default_entropy_weight, DegeneratePolicy, NormalizationConfig, ScoringWeights,
    WEIGHT_SUM_TOLERANCE,
};
