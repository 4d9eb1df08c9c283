//! Error handling types and utilities.

use std::path::PathBuf;

/// Error returned when the symbol catalog cannot be acquired.
///
/// Every variant collapses to the same user-facing outcome: the session enters
/// [`LoadingState::Failure`](crate::session::LoadingState::Failure) and search
/// stays disabled.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Reading or fetching the catalog resource failed.
    #[error("Failed to read catalog from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The payload was fetched but is not a valid catalog.
    #[error("Failed to parse catalog: {0}")]
    Parse(String),
    /// Two rows share the same id, so references would be ambiguous.
    #[error("Catalog contains duplicate id {0}")]
    DuplicateId(u32),
    /// A custom fetcher failed for a reason of its own.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Error returned when a [`SearchConfig`](crate::config::SearchConfig) is rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: `{field}` must be greater than zero")]
    Zero { field: &'static str },
}
