use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use glossa_core::config::DEFAULT_CATALOG_DIR;
use glossa_core::{CatalogSource, DirSource, LocaleCode, LocaleEngine, Vars};
use serde::Serialize;
use tokio::signal;

use crate::error::ApiError;
use crate::locale::{handle_locale, request_locale, translate_in_request};

#[derive(Clone)]
struct AppState {
    engine: Arc<LocaleEngine>,
    catalogs: Arc<DirSource>,
}

#[derive(Debug, Serialize)]
pub struct LocaleIndex {
    pub default: String,
    pub supported: Vec<LocaleCode>,
}

#[derive(Debug, Serialize)]
pub struct Translation {
    pub locale: LocaleCode,
    pub key: String,
    pub text: String,
}

/// Serves catalogs to clients and translates on behalf of callers that
/// cannot run an engine themselves.
///
/// Routes:
/// - `GET /locales`: default and supported locales
/// - `GET /locales/{locale}.json`: the raw catalog
/// - `GET /t/{key}?name=value`: `key` translated for the request locale
pub struct CatalogServer {
    engine: Arc<LocaleEngine>,
    addr: String,
    catalog_dir: PathBuf,
    extra: Router,
}

impl CatalogServer {
    pub fn new(engine: Arc<LocaleEngine>, addr: impl Into<String>) -> Self {
        Self {
            engine,
            addr: addr.into(),
            catalog_dir: PathBuf::from(DEFAULT_CATALOG_DIR),
            extra: Router::new(),
        }
    }

    pub fn catalog_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.catalog_dir = dir.into();
        self
    }

    /// Extra routes; they see the negotiated locale too.
    pub fn mount(mut self, router: Router) -> Self {
        self.extra = self.extra.merge(router);
        self
    }

    /// The locale middleware is applied last so it also wraps mounted
    /// routes.
    pub fn into_router(self) -> Router {
        let state = AppState {
            engine: Arc::clone(&self.engine),
            catalogs: Arc::new(DirSource::new(self.catalog_dir)),
        };

        Router::new()
            .route("/locales", get(locale_index))
            .route("/locales/{file}", get(catalog_file))
            .route("/t/{key}", get(translate_key))
            .with_state(state)
            .merge(self.extra)
            .layer(from_fn_with_state(self.engine, handle_locale))
    }

    pub async fn start(self) -> anyhow::Result<()> {
        log::info!("🚀 Starting catalog server at {}", self.addr);

        self.engine.preload().await;
        self.engine.init().await;

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        let router = self.into_router();

        let server = axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown());
        if let Err(e) = server.await {
            log::error!("Server error: {}", e);
            return Err(anyhow::anyhow!("Server error: {}", e));
        }

        log::info!("🛑 Catalog server stopped");
        Ok(())
    }
}

async fn locale_index(State(state): State<AppState>) -> Json<LocaleIndex> {
    Json(LocaleIndex {
        default: state.engine.default_locale().to_string(),
        supported: state.engine.supported_locales().to_vec(),
    })
}

async fn catalog_file(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let locale = file
        .strip_suffix(".json")
        .ok_or_else(|| ApiError::NotFound(file.clone()))?;
    // only configured codes ever reach the filesystem
    if !state.engine.is_supported(locale) {
        return Err(ApiError::UnsupportedLocale(locale.to_string()));
    }

    let bytes = state.catalogs.fetch(locale).await.map_err(|e| {
        log::warn!("Catalog for {} unavailable: {:#}", locale, e);
        ApiError::CatalogUnavailable(locale.to_string())
    })?;
    Ok(([(CONTENT_TYPE, "application/json; charset=utf-8")], bytes).into_response())
}

async fn translate_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Translation> {
    let vars: Vars = params.into_iter().collect();
    let text = translate_in_request(&state.engine, &key, &vars);
    Json(Translation {
        locale: request_locale().unwrap_or_else(|| state.engine.default_locale().to_string()),
        key,
        text,
    })
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            log::info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
