//! Engine configuration loaded from YAML, with `${VAR}` / `${VAR:default}`
//! environment substitution.

use dotenvy::dotenv;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use validator::Validate;

use crate::error::ConfigError;

pub const DEFAULT_STORAGE_KEY: &str = "glossa_lang";
pub const DEFAULT_CATALOG_DIR: &str = "./locales";
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Settings for a [`LocaleEngine`](crate::LocaleEngine).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EngineConfig {
    /// Ordered list of locale codes the engine accepts.
    #[validate(length(min = 1))]
    pub supported_locales: Vec<String>,
    /// Fallback locale, must be listed in `supported_locales`.
    #[validate(length(min = 1))]
    pub default_locale: String,
    /// Directory holding `{locale}.json` catalogs.
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: PathBuf,
    /// Key of the persisted locale selection.
    #[serde(default = "default_storage_key")]
    #[validate(length(min = 1))]
    pub storage_key: String,
    /// TOML file holding the persisted selection. No persistence when unset.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    /// Buffered locale-changed notifications per subscriber.
    #[serde(default = "default_channel_capacity")]
    #[validate(range(min = 1))]
    pub channel_capacity: usize,
    /// Short labels shown by the language switcher, e.g. `uk: UA`.
    #[serde(default)]
    pub short_codes: HashMap<String, String>,
    /// Raw `logging:` section, consumed by `glossa-logger`.
    #[serde(default)]
    pub logging: Option<serde_yaml::Value>,
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CATALOG_DIR)
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

impl EngineConfig {
    /// Minimal configuration with defaults for everything but the locales.
    pub fn new(supported_locales: Vec<String>, default_locale: impl Into<String>) -> Self {
        Self {
            supported_locales,
            default_locale: default_locale.into(),
            catalog_dir: default_catalog_dir(),
            storage_key: default_storage_key(),
            storage_path: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            short_codes: HashMap::new(),
            logging: None,
        }
    }

    /// Field validation plus the cross-field check that the default locale
    /// is supported.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if !self.supported_locales.contains(&self.default_locale) {
            return Err(ConfigError::DefaultNotSupported(
                self.default_locale.clone(),
            ));
        }
        Ok(())
    }
}

/// Expand `${VAR}` and `${VAR:default}` placeholders from the environment.
fn replace_vars(yaml_content: &str) -> String {
    // a missing .env file is fine
    let _ = dotenv();

    static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = VAR_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([A-Z0-9_]+)(?::([^\}]*))?\}").expect("Invalid regex pattern")
    });

    re.replace_all(yaml_content, |caps: &regex::Captures| {
        let default = caps.get(2).map(|m| m.as_str());
        env::var(&caps[1]).unwrap_or_else(|_| default.unwrap_or("").to_string())
    })
    .into_owned()
}

/// Load and validate a configuration file.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    load_from_str(&content)
}

/// Load and validate configuration from a YAML string.
pub fn load_from_str(yaml_content: &str) -> Result<EngineConfig, ConfigError> {
    let replaced = replace_vars(yaml_content);
    let config: EngineConfig = serde_yaml::from_str(&replaced)?;
    config.check()?;
    Ok(config)
}

/// Embed a YAML configuration file at compile time and parse it.
#[macro_export]
macro_rules! include_config {
    ($path:expr) => {
        $crate::config::load_from_str(include_str!($path))
    };
}
