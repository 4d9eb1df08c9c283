//! Full-text search over the symbol catalog.
//!
//! This module provides the incremental index builder, the immutable index it
//! produces, and the two query modes (contains and fuzzy) the session uses.

pub(crate) mod index;
pub(crate) mod query;
pub(crate) mod scoring;
pub(crate) mod tokenize;

pub use index::{BuildStatus, Field, FieldBoosts, IndexBuilder, SearchHit, SearchIndex};
pub use query::{MatchMode, Query};
