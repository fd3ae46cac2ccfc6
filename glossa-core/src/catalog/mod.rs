//! Per-locale translation catalogs and the process-lifetime catalog cache.
//!
//! A failed load never surfaces as an error: it yields an empty
//! [`Catalog`], so resolution only ever branches on emptiness.

mod source;

pub use source::{CatalogSource, DirSource, MemorySource};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, info, warn};

use crate::error::CatalogError;
use crate::locale::LocaleCode;

/// A catalog node: a string leaf or a nested catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Text(String),
    Nested(Catalog),
}

/// Immutable nested mapping of translations for one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: HashMap<String, Entry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object payload. Leaves that are neither strings nor
    /// objects are dropped.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, CatalogError> {
        match serde_json::from_slice(bytes)? {
            Value::Object(map) => Ok(Self::from_object(map)),
            _ => Err(CatalogError::NotAnObject),
        }
    }

    fn from_object(map: Map<String, Value>) -> Self {
        let entries = map
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(text) => Some((key, Entry::Text(text))),
                Value::Object(inner) => Some((key, Entry::Nested(Self::from_object(inner)))),
                _ => None,
            })
            .collect();
        Self { entries }
    }

    pub fn with_text(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.entries.insert(key.into(), Entry::Text(text.into()));
        self
    }

    pub fn with_nested(mut self, key: impl Into<String>, nested: Catalog) -> Self {
        self.entries.insert(key.into(), Entry::Nested(nested));
        self
    }

    pub fn get(&self, segment: &str) -> Option<&Entry> {
        self.entries.get(segment)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

type PendingLoad = Shared<BoxFuture<'static, Arc<Catalog>>>;

#[derive(Default)]
struct Slots {
    loaded: HashMap<LocaleCode, Arc<Catalog>>,
    pending: HashMap<LocaleCode, PendingLoad>,
}

fn lock(slots: &Mutex<Slots>) -> MutexGuard<'_, Slots> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Loads catalogs from a [`CatalogSource`] and caches successful loads
/// for the lifetime of the store.
///
/// Concurrent [`load`](Self::load) calls for the same locale share one
/// in-flight fetch. Each fetch runs on its own task, so it completes and
/// is cached even when every caller awaiting it is dropped. Failed loads
/// are not cached, so a later call retries.
///
/// Loading requires a running Tokio runtime.
pub struct CatalogStore {
    source: Arc<dyn CatalogSource>,
    slots: Arc<Mutex<Slots>>,
}

impl CatalogStore {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            slots: Arc::new(Mutex::new(Slots::default())),
        }
    }

    /// Cache-only lookup.
    pub fn get(&self, locale: &str) -> Option<Arc<Catalog>> {
        lock(&self.slots).loaded.get(locale).cloned()
    }

    pub fn is_loading(&self, locale: &str) -> bool {
        lock(&self.slots).pending.contains_key(locale)
    }

    /// Fetch and parse the catalog for `locale`, or return the cached one.
    ///
    /// Never fails: transport and parse failures resolve to an empty
    /// catalog after logging a warning.
    pub async fn load(&self, locale: &str) -> Arc<Catalog> {
        let pending = {
            let mut slots = lock(&self.slots);
            if let Some(catalog) = slots.loaded.get(locale) {
                return Arc::clone(catalog);
            }
            match slots.pending.get(locale) {
                Some(pending) => {
                    debug!(locale, "joining in-flight catalog load");
                    pending.clone()
                }
                None => {
                    let pending = self.start_load(locale.to_string());
                    slots.pending.insert(locale.to_string(), pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    fn start_load(&self, locale: LocaleCode) -> PendingLoad {
        let source = Arc::clone(&self.source);
        let slots = Arc::clone(&self.slots);
        let orphaned: Weak<Mutex<Slots>> = Arc::downgrade(&self.slots);
        let task_locale = locale.clone();

        tokio::spawn(async move {
            let fetched = fetch_catalog(source.as_ref(), &task_locale).await;
            settle(&slots, task_locale, fetched)
        })
        .map(move |joined| {
            joined.unwrap_or_else(|err| {
                warn!(locale = %locale, error = %err, "catalog load task failed, using empty catalog");
                if let Some(slots) = orphaned.upgrade() {
                    lock(&slots).pending.remove(&locale);
                }
                Arc::new(Catalog::new())
            })
        })
        .boxed()
        .shared()
    }
}

fn settle(
    slots: &Mutex<Slots>,
    locale: LocaleCode,
    fetched: Result<Catalog, CatalogError>,
) -> Arc<Catalog> {
    let mut slots = lock(slots);
    slots.pending.remove(&locale);
    match fetched {
        Ok(catalog) => {
            info!(locale = %locale, entries = catalog.len(), "loaded catalog");
            let catalog = Arc::new(catalog);
            slots.loaded.insert(locale, Arc::clone(&catalog));
            catalog
        }
        Err(err) => {
            warn!(locale = %locale, error = %err, "failed to load catalog, using empty catalog");
            Arc::new(Catalog::new())
        }
    }
}

async fn fetch_catalog(source: &dyn CatalogSource, locale: &str) -> Result<Catalog, CatalogError> {
    let bytes = source.fetch(locale).await?;
    Catalog::from_json_slice(&bytes)
}
