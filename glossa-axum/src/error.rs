use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unsupported locale: {0}")]
    UnsupportedLocale(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("catalog unavailable for locale {0}")]
    CatalogUnavailable(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (StatusCode::NOT_FOUND, body).into_response()
    }
}
