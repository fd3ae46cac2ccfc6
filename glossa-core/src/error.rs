use thiserror::Error;

/// Errors surfaced to callers of the engine's public API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The requested locale is not one of the configured supported locales.
    #[error("unsupported locale: {0}")]
    InvalidLocale(String),
}

/// Why a catalog could not be loaded.
///
/// Never returned from the public API: the catalog store recovers every
/// variant into an empty catalog and logs it.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog source failed: {0}")]
    Source(#[from] anyhow::Error),
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog root must be a JSON object")]
    NotAnObject,
}

/// Failures of the persisted locale selection.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("selection file is not valid TOML: {0}")]
    Decode(#[from] toml::de::Error),
    #[error("selection could not be encoded: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("default locale {0} is not in the supported locales")]
    DefaultNotSupported(String),
    #[error("at least one supported locale is required")]
    NoLocales,
}
