//! The public translation facade.
//!
//! `translate` never blocks and never fails. Before [`LocaleEngine::init`]
//! finishes it resolves against the default catalog when that is already
//! cached; afterwards it walks active locale → default locale → the key
//! itself.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{OnceCell, broadcast};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogSource, CatalogStore, DirSource};
use crate::config::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_STORAGE_KEY, EngineConfig};
use crate::error::{ConfigError, EngineError};
use crate::locale::{LocaleCode, LocaleState, SupportedLocales};
use crate::persist::{FileSelectionStore, NoopSelectionStore, SelectionStore};
use crate::resolver::{Vars, interpolate, resolve};

/// Readiness of the engine. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResolutionState {
    Uninitialized,
    Loading,
    Ready,
}

/// Broadcast after the default catalog first loads and after every
/// `set_locale`, carrying the locale active at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleChanged {
    pub locale: LocaleCode,
}

/// One entry of a language switcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleOption {
    pub code: LocaleCode,
    pub short_code: String,
    pub name: String,
    pub active: bool,
}

pub struct EngineBuilder {
    supported: SupportedLocales,
    source: Arc<dyn CatalogSource>,
    store: Arc<dyn SelectionStore>,
    storage_key: String,
    channel_capacity: usize,
    short_codes: HashMap<String, String>,
}

impl EngineBuilder {
    pub fn source(mut self, source: impl CatalogSource + 'static) -> Self {
        self.source = Arc::new(source);
        self
    }

    pub fn shared_source(mut self, source: Arc<dyn CatalogSource>) -> Self {
        self.source = source;
        self
    }

    pub fn selection_store(mut self, store: Arc<dyn SelectionStore>) -> Self {
        self.store = store;
        self
    }

    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Clamped to at least one.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn short_code(mut self, code: impl Into<String>, short: impl Into<String>) -> Self {
        self.short_codes.insert(code.into(), short.into());
        self
    }

    pub fn build(self) -> LocaleEngine {
        let (notifier, _) = broadcast::channel(self.channel_capacity);
        LocaleEngine {
            catalogs: CatalogStore::new(self.source),
            locale: LocaleState::new(self.supported, self.store, self.storage_key),
            readiness: Mutex::new(ResolutionState::Uninitialized),
            initialized: OnceCell::new(),
            notifier,
            short_codes: self.short_codes,
        }
    }
}

pub struct LocaleEngine {
    catalogs: CatalogStore,
    locale: LocaleState,
    readiness: Mutex<ResolutionState>,
    initialized: OnceCell<()>,
    notifier: broadcast::Sender<LocaleChanged>,
    short_codes: HashMap<String, String>,
}

impl fmt::Debug for LocaleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleEngine")
            .field("state", &self.state())
            .field("current", &self.locale.current())
            .field("supported", self.locale.supported())
            .finish_non_exhaustive()
    }
}

impl LocaleEngine {
    /// Defaults: catalogs from `./locales`, no persistence.
    pub fn builder(supported: SupportedLocales) -> EngineBuilder {
        EngineBuilder {
            supported,
            source: Arc::new(DirSource::new(crate::config::DEFAULT_CATALOG_DIR)),
            store: Arc::new(NoopSelectionStore),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            short_codes: HashMap::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.check()?;
        let supported =
            SupportedLocales::new(config.supported_locales.iter().cloned(), &config.default_locale)?;
        let store: Arc<dyn SelectionStore> = match &config.storage_path {
            Some(path) => Arc::new(FileSelectionStore::new(path)),
            None => Arc::new(NoopSelectionStore),
        };

        let builder = Self::builder(supported)
            .source(DirSource::new(&config.catalog_dir))
            .selection_store(store)
            .storage_key(&config.storage_key)
            .channel_capacity(config.channel_capacity);
        let builder = config
            .short_codes
            .iter()
            .fold(builder, |b, (code, short)| b.short_code(code, short));
        Ok(builder.build())
    }

    pub fn state(&self) -> ResolutionState {
        *self.readiness.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ResolutionState::Ready
    }

    fn advance(&self, next: ResolutionState) {
        let mut state = self.readiness.lock().unwrap_or_else(PoisonError::into_inner);
        if next > *state {
            *state = next;
        }
    }

    /// Load the default catalog, then the active one. Concurrent and
    /// repeated calls share the first run.
    pub async fn init(&self) {
        self.initialized
            .get_or_init(|| async {
                self.advance(ResolutionState::Loading);

                let default = self.default_locale().to_string();
                let catalog = self.catalogs.load(&default).await;
                if catalog.is_empty() {
                    warn!(locale = %default, "default catalog is empty");
                }

                // a set_locale issued while the default was loading wins
                let active = self.locale.current();
                if active != default {
                    self.catalogs.load(&active).await;
                }

                self.advance(ResolutionState::Ready);
                info!(locale = %active, "locale engine ready");
                self.notify();
            })
            .await;
    }

    /// Load every supported catalog, for callers translating per request.
    pub async fn preload(&self) {
        for code in self.supported_locales() {
            self.catalogs.load(code).await;
        }
    }

    pub fn current_locale(&self) -> LocaleCode {
        self.locale.current()
    }

    pub fn default_locale(&self) -> &str {
        self.locale.supported().default_locale()
    }

    pub fn supported_locales(&self) -> &[LocaleCode] {
        self.locale.supported().as_slice()
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.locale.supported().contains(code)
    }

    pub fn catalogs(&self) -> &CatalogStore {
        &self.catalogs
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LocaleChanged> {
        self.notifier.subscribe()
    }

    /// Switch the active locale and wait for its catalog.
    ///
    /// The locale becomes current before its catalog loads. When several
    /// switches overlap, the last one requested stays current no matter
    /// which load settles first. Re-selecting the current locale writes the
    /// selection again and notifies subscribers.
    pub async fn set_locale(&self, code: &str) -> Result<(), EngineError> {
        let reselected = self.locale.is_current(code);
        self.locale.set_locale(code)?;
        if reselected {
            debug!(locale = code, "locale already active, refreshing");
        } else {
            info!(locale = code, "locale switched");
        }

        self.catalogs.load(code).await;
        if !self.locale.is_current(code) {
            debug!(locale = code, "locale switch superseded before its catalog loaded");
        }
        self.notify();
        Ok(())
    }

    fn notify(&self) {
        let event = LocaleChanged {
            locale: self.locale.current(),
        };
        if self.notifier.send(event).is_err() {
            debug!("no locale subscribers");
        }
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<String> {
        let catalog = self.catalogs.get(locale)?;
        resolve(&catalog, key).map(str::to_string)
    }

    /// Resolve `key` in the active locale with fallback, then interpolate.
    ///
    /// A key found nowhere is returned unchanged and uninterpolated.
    pub fn translate(&self, key: &str, vars: &Vars) -> String {
        if key.is_empty() {
            return String::new();
        }

        let default = self.default_locale();
        let (locale, found) = if self.is_ready() {
            let active = self.locale.current();
            let found = self.lookup(&active, key).or_else(|| {
                if active == default {
                    None
                } else {
                    self.lookup(default, key)
                }
            });
            (active, found)
        } else {
            (default.to_string(), self.lookup(default, key))
        };

        match found {
            Some(template) => interpolate(&template, vars),
            None => {
                debug!(key, locale = %locale, ready = self.is_ready(), "translation missing");
                key.to_string()
            }
        }
    }

    pub fn t(&self, key: &str) -> String {
        self.translate(key, &Vars::new())
    }

    /// Resolve against an explicit locale without touching the active one:
    /// `locale` → default → key. Uses cached catalogs only.
    pub fn translate_for(&self, locale: &str, key: &str, vars: &Vars) -> String {
        if key.is_empty() {
            return String::new();
        }

        let default = self.default_locale();
        let found = Some(locale)
            .filter(|code| self.is_supported(code))
            .and_then(|code| self.lookup(code, key))
            .or_else(|| self.lookup(default, key));

        match found {
            Some(template) => interpolate(&template, vars),
            None => {
                debug!(key, locale, "translation missing");
                key.to_string()
            }
        }
    }

    /// Options for a language switcher, in supported-locale order.
    pub fn switcher_options(&self) -> Vec<LocaleOption> {
        let active = self.locale.current();
        self.supported_locales()
            .iter()
            .map(|code| {
                let short_code = self
                    .short_codes
                    .get(code)
                    .cloned()
                    .unwrap_or_else(|| code.to_uppercase());
                let key = format!("layout.languages.{code}");
                let name = match self.translate(&key, &Vars::new()) {
                    name if name == key => short_code.clone(),
                    name => name,
                };
                LocaleOption {
                    code: code.clone(),
                    short_code,
                    name,
                    active: *code == active,
                }
            })
            .collect()
    }
}
