//! Request-scoped locale, negotiated from `Accept-Language`.

mod negotiate;

pub use negotiate::negotiate;

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::{ACCEPT_LANGUAGE, CONTENT_LANGUAGE};
use axum::middleware::Next;
use axum::response::Response;
use glossa_core::{LocaleCode, LocaleEngine, Vars};
use std::sync::Arc;
use tokio::task_local;

task_local! {
    pub static REQUEST_LOCALE: LocaleCode;
}

/// Middleware: negotiate the request locale, expose it to handlers and
/// echo it as `Content-Language`.
pub async fn handle_locale(
    State(engine): State<Arc<LocaleEngine>>,
    req: Request,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());
    let locale = negotiate(header, engine.supported_locales(), engine.default_locale());

    let content_language = HeaderValue::from_str(&locale).ok();
    let mut response = REQUEST_LOCALE.scope(locale, next.run(req)).await;
    if let Some(value) = content_language {
        response.headers_mut().insert(CONTENT_LANGUAGE, value);
    }
    response
}

/// The negotiated locale, when called inside a request.
pub fn request_locale() -> Option<LocaleCode> {
    REQUEST_LOCALE.try_with(Clone::clone).ok()
}

/// Translate in the request's locale without switching the engine.
/// Outside a request this is the engine's regular `translate`.
pub fn translate_in_request(engine: &LocaleEngine, key: &str, vars: &Vars) -> String {
    match request_locale() {
        Some(locale) => engine.translate_for(&locale, key, vars),
        None => engine.translate(key, vars),
    }
}
