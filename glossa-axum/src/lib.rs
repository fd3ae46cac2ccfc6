pub mod error;
pub mod locale;
pub mod server;

pub use error::ApiError;
pub use locale::{negotiate, request_locale, translate_in_request};
pub use server::CatalogServer;
