//! Client configuration: API endpoint, timeouts and session storage location.

mod loader;
mod types;

pub use loader::{ConfigError, API_URL_ENV};
pub use types::{ApiConfig, Config, StorageConfig, DEFAULT_BASE_URL};
