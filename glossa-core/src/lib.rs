pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod global;
pub mod locale;
pub mod persist;
pub mod resolver;
pub mod sync;

pub use catalog::{Catalog, CatalogSource, CatalogStore, DirSource, Entry, MemorySource};
pub use config::EngineConfig;
pub use engine::{EngineBuilder, LocaleChanged, LocaleEngine, LocaleOption, ResolutionState};
pub use error::{CatalogError, ConfigError, EngineError, PersistError};
pub use global::{global, install};
pub use locale::{LocaleCode, LocaleState, SupportedLocales};
pub use persist::{FileSelectionStore, MemorySelectionStore, NoopSelectionStore, SelectionStore};
pub use resolver::{Vars, interpolate, resolve};
pub use sync::{Binding, UiSynchronizer, UiTree};

pub use async_trait::async_trait;
