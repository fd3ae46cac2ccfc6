use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;

/// Where catalog payloads come from, addressed by locale code.
///
/// Implementations return the raw UTF-8 JSON payload. Transport failures
/// are reported as errors; the catalog store turns them into empty
/// catalogs.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self, locale: &str) -> anyhow::Result<Vec<u8>>;
}

/// Reads `{dir}/{locale}.json`.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_of(&self, locale: &str) -> PathBuf {
        self.dir.join(format!("{locale}.json"))
    }
}

#[async_trait]
impl CatalogSource for DirSource {
    async fn fetch(&self, locale: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.path_of(locale);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))
    }
}

/// Catalog payloads held in memory, e.g. embedded at compile time.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    payloads: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_static(entries: &[(&str, &[u8])]) -> Self {
        entries
            .iter()
            .fold(Self::new(), |source, (locale, bytes)| source.with(*locale, *bytes))
    }

    pub fn with(mut self, locale: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        self.payloads.insert(locale.into(), payload.into());
        self
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.payloads.keys().map(String::as_str)
    }
}

#[async_trait]
impl CatalogSource for MemorySource {
    async fn fetch(&self, locale: &str) -> anyhow::Result<Vec<u8>> {
        self.payloads
            .get(locale)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no catalog for locale {locale}"))
    }
}
