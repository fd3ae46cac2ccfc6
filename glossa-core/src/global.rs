//! Optional process-wide engine behind the [`t!`](crate::t) macro.

use std::sync::{Arc, OnceLock};
use tracing::error;

use crate::engine::LocaleEngine;
use crate::resolver::Vars;

static GLOBAL_ENGINE: OnceLock<Arc<LocaleEngine>> = OnceLock::new();

/// Install the process-wide engine. Only the first call wins.
pub fn install(engine: Arc<LocaleEngine>) -> Result<(), Arc<LocaleEngine>> {
    GLOBAL_ENGINE.set(engine).inspect_err(|_| {
        error!("global locale engine already installed");
    })
}

pub fn global() -> Option<&'static Arc<LocaleEngine>> {
    GLOBAL_ENGINE.get()
}

/// Translate through the global engine; the key itself when none is
/// installed.
pub fn translate(key: &str, vars: &Vars) -> String {
    match global() {
        Some(engine) => engine.translate(key, vars),
        None => key.to_string(),
    }
}

/// `t!("key")` or `t!("key", name = value, ...)` against the global engine.
#[macro_export]
macro_rules! t {
    ($key:expr) => {
        $crate::global::translate($key, &$crate::Vars::new())
    };
    ($key:expr, $($name:ident = $value:expr),+ $(,)?) => {
        $crate::global::translate(
            $key,
            &$crate::Vars::new()$(.with(stringify!($name), $value))+,
        )
    };
}
