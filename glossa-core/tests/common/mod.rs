#![allow(dead_code)]

use glossa_core::{CatalogSource, MemorySource, async_trait};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// A memory source that counts fetches per locale and can hold a locale's
/// fetch until it is released.
pub struct TestSource {
    inner: MemorySource,
    fetches: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
    gates: HashMap<String, Notify>,
}

impl TestSource {
    pub fn new(inner: MemorySource) -> Self {
        Self {
            inner,
            fetches: Mutex::new(HashMap::new()),
            total: AtomicUsize::new(0),
            gates: HashMap::new(),
        }
    }

    pub fn gated(mut self, locale: &str) -> Self {
        self.gates.insert(locale.to_string(), Notify::new());
        self
    }

    pub fn release(&self, locale: &str) {
        self.gates[locale].notify_one();
    }

    pub fn fetches(&self, locale: &str) -> usize {
        self.fetches.lock().unwrap().get(locale).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for TestSource {
    async fn fetch(&self, locale: &str) -> anyhow::Result<Vec<u8>> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(locale.to_string())
            .or_default() += 1;
        self.total.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = self.gates.get(locale) {
            gate.notified().await;
        }
        self.inner.fetch(locale).await
    }
}

pub const UK: &str = r#"{
    "a": {"b": "X"},
    "greeting": "Привіт, {{name}}!",
    "only_uk": "лише українською",
    "layout": {"languages": {"uk": "Українська", "en": "Англійська"}},
    "nav": {"home": "Головна"}
}"#;

pub const EN: &str = r#"{
    "greeting": "Hello, {{name}}!",
    "layout": {"languages": {"uk": "Ukrainian", "en": "English"}},
    "nav": {"home": "Home"}
}"#;

pub fn catalogs() -> MemorySource {
    MemorySource::new().with("uk", UK).with("en", EN)
}
