//! Client configuration module.
//!
//! Handles loading, validating, and merging `dish-go.toml`. Stock defaults are
//! overridden by the user's file, and the service URL can be overridden once
//! more from the environment:
//!
//! ```text
//! stock defaults  <  dish-go.toml  <  DISH_GO_API_URL
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [api]
//! base_url = "http://localhost:3000"
//! # timeout_secs = 30      # Omit to wait for the server indefinitely
//!
//! [image]
//! max_width = 1024          # Bounding box for upload payloads
//! max_height = 1024
//! quality = 0.8             # JPEG quality, 0.0-1.0
//!
//! [request]
//! recipe_count = 3          # 1-5
//! use_all_ingredients = false
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::form::{DEFAULT_RECIPE_COUNT, RECIPE_COUNT_RANGE};
use crate::imaging::{NormalizeParams, Quality};

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "DISH_GO_API_URL";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Client configuration loaded from `dish-go.toml`.
///
/// All fields have defaults. User files need only specify the values they
/// want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Recipe service location.
    pub api: ApiConfig,
    /// Upload payload shaping.
    pub image: ImageConfig,
    /// Defaults for the request options.
    pub request: RequestConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "api.base_url must start with http:// or https:// (got {url:?})"
            )));
        }
        if self.api.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be positive; omit it to disable the timeout".into(),
            ));
        }
        if self.image.max_width == 0 || self.image.max_height == 0 {
            return Err(ConfigError::Validation(
                "image.max_width and image.max_height must be non-zero".into(),
            ));
        }
        if !(self.image.quality > 0.0 && self.image.quality <= 1.0) {
            return Err(ConfigError::Validation(
                "image.quality must be in (0.0, 1.0]".into(),
            ));
        }
        if !RECIPE_COUNT_RANGE.contains(&self.request.recipe_count) {
            return Err(ConfigError::Validation(format!(
                "request.recipe_count must be {}-{}",
                RECIPE_COUNT_RANGE.start(),
                RECIPE_COUNT_RANGE.end()
            )));
        }
        Ok(())
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in the
    /// binary; tests pass a closure instead of mutating the process env.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        self
    }

    /// Normalize parameters for the configured bounding box and quality.
    pub fn normalize_params(&self) -> NormalizeParams {
        NormalizeParams {
            max_width: self.image.max_width,
            max_height: self.image.max_height,
            quality: Quality::from_fraction(self.image.quality),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub base_url: String,
    /// Request timeout. `None` waits for the server indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig {
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality as a fraction, `0.0..=1.0`.
    pub quality: f32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_width: 1024,
            max_height: 1024,
            quality: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestConfig {
    pub recipe_count: u8,
    pub use_all_ingredients: bool,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            recipe_count: DEFAULT_RECIPE_COUNT,
            use_all_ingredients: false,
        }
    }
}

// =============================================================================
// Loading and merging
// =============================================================================

/// Stock defaults as a TOML value, the base layer for merging.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` when it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(toml::from_str(&content)?))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path` over stock defaults.
///
/// A missing file yields the defaults. Environment overrides are not
/// applied here; see [`load_config_from_env`].
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(path)?)
}

/// [`load_config`] followed by the process environment overrides.
pub fn load_config_from_env(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = load_config(path)?.with_env_overrides(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `dish-go.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# dish-go Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Recipe service
# ---------------------------------------------------------------------------
[api]
# Base URL of the recipe service; requests go to {base_url}/cooking.
# The DISH_GO_API_URL environment variable takes precedence.
base_url = "http://localhost:3000"

# Seconds to wait for a response. Omit to wait indefinitely.
# timeout_secs = 30

# ---------------------------------------------------------------------------
# Upload payloads
# ---------------------------------------------------------------------------
[image]
# Photos are shrunk (never enlarged) to fit inside this box.
max_width = 1024
max_height = 1024

# JPEG quality, 0.0 (worst) to 1.0 (best).
quality = 0.8

# ---------------------------------------------------------------------------
# Request defaults
# ---------------------------------------------------------------------------
[request]
# Number of recipes to ask for (1-5).
recipe_count = 3

# Ask the service to use every detected ingredient.
use_all_ingredients = false
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.api.timeout(), None);
        assert_eq!(config.request.recipe_count, 3);
    }

    #[test]
    fn default_normalize_params() {
        let params = AppConfig::default().normalize_params();
        assert_eq!(params, NormalizeParams::default());
        assert_eq!(params.quality.value(), 80);
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: AppConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn stock_defaults_value_round_trips() {
        let config: AppConfig = stock_defaults_value().try_into().unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[image]
quality = 0.6
"#,
        )
        .unwrap();
        assert_eq!(config.image.quality, 0.6);
        assert_eq!(config.image.max_width, 1024);
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn merge_toml_overrides_nested_keys_only() {
        let overlay: toml::Value = toml::from_str(
            r#"
[api]
timeout_secs = 10
"#,
        )
        .unwrap();
        let merged = merge_toml(stock_defaults_value(), overlay);
        let api = merged.get("api").unwrap();
        assert_eq!(api.get("timeout_secs").unwrap().as_integer(), Some(10));
        assert_eq!(
            api.get("base_url").unwrap().as_str(),
            Some("http://localhost:3000")
        );
    }

    #[test]
    fn merge_toml_scalar_replaces_table() {
        let base: toml::Value = toml::from_str("[a]\nb = 1").unwrap();
        let overlay: toml::Value = toml::from_str("a = 2").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(2));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[image]\nqualty = 0.5\n");
        assert!(result.unwrap_err().to_string().contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[imagez]\nquality = 0.5\n");
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cases: Vec<(&str, fn(&mut AppConfig))> = vec![
            ("base_url", |c| c.api.base_url = "localhost:3000".into()),
            ("timeout_secs", |c| c.api.timeout_secs = Some(0)),
            ("max_width", |c| c.image.max_width = 0),
            ("quality", |c| c.image.quality = 0.0),
            ("quality", |c| c.image.quality = 1.5),
            ("recipe_count", |c| c.request.recipe_count = 6),
        ];
        for (field, mutate) in cases {
            let mut config = AppConfig::default();
            mutate(&mut config);
            let err = config.validate().unwrap_err().to_string();
            assert!(err.contains(field), "{field}: {err}");
        }
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("dish-go.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dish-go.toml");
        fs::write(
            &path,
            r#"
[api]
base_url = "https://recipes.example.com/prod"
timeout_secs = 20

[request]
recipe_count = 5
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.api.base_url, "https://recipes.example.com/prod");
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(20)));
        assert_eq!(config.request.recipe_count, 5);
        assert!(!config.request.use_all_ingredients);
    }

    #[test]
    fn load_config_validates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dish-go.toml");
        fs::write(&path, "[request]\nrecipe_count = 0\n").unwrap();
        assert!(matches!(
            load_config(&path).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn load_config_rejects_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dish-go.toml");
        fs::write(&path, "[api\n").unwrap();
        assert!(matches!(load_config(&path).unwrap_err(), ConfigError::Toml(_)));
    }

    #[test]
    fn env_override_replaces_base_url() {
        let config = AppConfig::default().with_env_overrides(|key| {
            (key == API_URL_ENV).then(|| " https://api.example.com ".to_string())
        });
        assert_eq!(config.api.base_url, "https://api.example.com");
    }

    #[test]
    fn blank_env_value_is_ignored() {
        let config = AppConfig::default().with_env_overrides(|_| Some("  ".into()));
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(AppConfig::default().with_env_overrides(no_env), AppConfig::default());
    }
}
