//! Incremental documentation search: a batched index builder and the search
//! widget state machine that queries it.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod search;
pub mod session;
pub mod worker;

pub use catalog::{Catalog, CatalogFetch, CatalogRecord, CatalogSource, FileCatalog};
pub use config::SearchConfig;
pub use error::{CatalogError, ConfigError};
pub use session::{Effect, LoadingState, ResultRow, SearchSession};
pub use worker::{Host, WidgetEvent, WidgetHandle, WidgetRuntime};
