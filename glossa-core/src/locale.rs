//! The active-locale cell and its persisted selection.

use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

use crate::error::{ConfigError, EngineError, PersistError};
use crate::persist::SelectionStore;

/// A locale identifier such as `"uk"` or `"en"`.
pub type LocaleCode = String;

/// The ordered, fixed set of locales the engine accepts, with its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedLocales {
    codes: Vec<LocaleCode>,
    default: LocaleCode,
}

impl SupportedLocales {
    /// Duplicates are dropped, keeping the first occurrence.
    pub fn new<I, S>(codes: I, default: impl Into<String>) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<LocaleCode> = Vec::new();
        for code in codes.into_iter().map(Into::into) {
            if !unique.contains(&code) {
                unique.push(code);
            }
        }
        if unique.is_empty() {
            return Err(ConfigError::NoLocales);
        }

        let default = default.into();
        if !unique.contains(&default) {
            return Err(ConfigError::DefaultNotSupported(default));
        }
        Ok(Self {
            codes: unique,
            default,
        })
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    pub fn default_locale(&self) -> &str {
        &self.default
    }

    pub fn as_slice(&self) -> &[LocaleCode] {
        &self.codes
    }
}

/// Process-wide current locale.
///
/// Starts from the persisted selection when it names a supported locale,
/// else from the default locale.
pub struct LocaleState {
    supported: SupportedLocales,
    current: RwLock<LocaleCode>,
    store: Arc<dyn SelectionStore>,
    storage_key: String,
}

impl LocaleState {
    pub fn new(
        supported: SupportedLocales,
        store: Arc<dyn SelectionStore>,
        storage_key: impl Into<String>,
    ) -> Self {
        let storage_key = storage_key.into();
        let initial = match store.read(&storage_key) {
            Ok(Some(saved)) if supported.contains(&saved) => saved,
            Ok(Some(saved)) => {
                warn!(locale = %saved, "ignoring unsupported persisted locale");
                supported.default_locale().to_string()
            }
            Ok(None) => supported.default_locale().to_string(),
            Err(err) => {
                warn!(error = %err, "failed to read persisted locale");
                supported.default_locale().to_string()
            }
        };
        debug!(locale = %initial, "initial locale");

        Self {
            supported,
            current: RwLock::new(initial),
            store,
            storage_key,
        }
    }

    pub fn current(&self) -> LocaleCode {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_current(&self, code: &str) -> bool {
        *self.current.read().unwrap_or_else(PoisonError::into_inner) == code
    }

    pub fn supported(&self) -> &SupportedLocales {
        &self.supported
    }

    /// Make `code` current and persist it.
    ///
    /// Unsupported codes are rejected without touching state. Persistence
    /// failures are logged and do not fail the call.
    pub fn set_locale(&self, code: &str) -> Result<(), EngineError> {
        if !self.supported.contains(code) {
            warn!(locale = code, "unsupported locale");
            return Err(EngineError::InvalidLocale(code.to_string()));
        }

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = code.to_string();

        if let Err(err) = self.persist(code) {
            warn!(locale = code, error = %err, "failed to persist locale selection");
        }
        Ok(())
    }

    /// Best-effort write of the selection; the caller may drop the result.
    pub fn persist(&self, code: &str) -> Result<(), PersistError> {
        self.store.write(&self.storage_key, code)
    }
}
