//! The symbol catalog: the ordered set of documentable records the widget searches.
//!
//! A catalog is either resident (handed over at construction) or fetched lazily the
//! first time the search input gains focus. Both paths produce the same immutable
//! [`Catalog`], shared behind an `Arc` for the lifetime of the session.

use crate::error::CatalogError;
use ahash::AHashMap;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    path::PathBuf,
    sync::Arc,
};

/// One documentable symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Unique within the catalog; doubles as the index reference.
    pub id: u32,
    /// Category tag, resolved through [`Catalog::kind_label`].
    pub kind: u32,
    /// Primary searchable text.
    pub name: String,
    /// Path relative to the documentation base url.
    pub url: String,
    /// Styling tag passed through to rendered rows verbatim.
    #[serde(default)]
    pub classes: String,
    /// Enclosing scope, searched with a lower weight than `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// Wire shape of a catalog payload.
#[derive(Debug, Default, Deserialize)]
struct CatalogPayload {
    #[serde(default)]
    kinds: HashMap<u32, String>,
    #[serde(default)]
    rows: Vec<CatalogRecord>,
}

/// An immutable, ordered catalog with an id lookup table.
#[derive(Debug, Default)]
pub struct Catalog {
    kinds: HashMap<u32, String>,
    rows: Vec<CatalogRecord>,
    positions: AHashMap<u32, usize>,
}

impl Catalog {
    /// Build a catalog from rows in their canonical order.
    ///
    /// Fails if two rows share an id, since index references could no longer be
    /// resolved unambiguously.
    pub fn new(
        rows: Vec<CatalogRecord>,
        kinds: HashMap<u32, String>,
    ) -> Result<Self, CatalogError> {
        let mut positions = AHashMap::with_capacity(rows.len());
        for (position, row) in rows.iter().enumerate() {
            if positions.insert(row.id, position).is_some() {
                return Err(CatalogError::DuplicateId(row.id));
            }
        }
        Ok(Self {
            kinds,
            rows,
            positions,
        })
    }

    /// Parse a catalog payload.
    ///
    /// Accepts either a bare JSON object `{"kinds": {...}, "rows": [...]}` or a script
    /// that assigns such an object (`window.searchData = {...};`).
    pub fn parse(source: &str) -> Result<Self, CatalogError> {
        let trimmed = source.trim();
        let json = if trimmed.starts_with('{') {
            trimmed
        } else {
            match (trimmed.find('{'), trimmed.rfind('}')) {
                (Some(start), Some(end)) if start < end => &trimmed[start..=end],
                _ => {
                    return Err(CatalogError::Parse(
                        "payload does not contain a catalog object".to_string(),
                    ));
                }
            }
        };

        let payload: CatalogPayload = serde_json::from_str(json)?;
        Self::new(payload.rows, payload.kinds)
    }

    pub fn rows(&self) -> &[CatalogRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look a record up by id.
    pub fn get(&self, id: u32) -> Option<&CatalogRecord> {
        self.positions.get(&id).map(|&position| &self.rows[position])
    }

    /// Human-readable label for a kind tag, if the catalog declares one.
    pub fn kind_label(&self, kind: u32) -> Option<&str> {
        self.kinds.get(&kind).map(String::as_str)
    }
}

/// An asynchronous, one-shot catalog fetch.
pub trait CatalogFetch: Send + Sync {
    fn fetch(&self) -> BoxFuture<'static, Result<Catalog, CatalogError>>;
}

impl Debug for dyn CatalogFetch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("CatalogFetch")
    }
}

/// Where the session gets its catalog from.
#[derive(Clone)]
pub enum CatalogSource {
    /// Already in memory; acquisition completes synchronously.
    Resident(Arc<Catalog>),
    /// Fetched on first use.
    Fetch(Arc<dyn CatalogFetch>),
}

impl Debug for CatalogSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resident(catalog) => f
                .debug_tuple("Resident")
                .field(&catalog.len())
                .finish(),
            Self::Fetch(_) => f.debug_tuple("Fetch").finish(),
        }
    }
}

impl From<Catalog> for CatalogSource {
    fn from(catalog: Catalog) -> Self {
        Self::Resident(Arc::new(catalog))
    }
}

/// Reads a catalog payload from disk.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogFetch for FileCatalog {
    fn fetch(&self) -> BoxFuture<'static, Result<Catalog, CatalogError>> {
        let path = self.path.clone();
        async move {
            let source = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| CatalogError::Io {
                    path: path.clone(),
                    source,
                })?;
            let catalog = Catalog::parse(&source)?;
            tracing::debug!(
                "Read catalog from {} ({} rows)",
                path.display(),
                catalog.len()
            );
            Ok(catalog)
        }
        .boxed()
    }
}
