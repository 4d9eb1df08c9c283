//! Query parsing and match modes.

/// How clauses are compared to indexed terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// The term must contain the clause (wildcards on both sides).
    Contains,
    /// Like [`MatchMode::Contains`], additionally tolerating `distance` edits.
    Fuzzy { distance: usize },
}

/// A parsed query: lowercase, whitespace-separated clauses.
///
/// Clauses are OR-ed together; a record matches when any clause matches one of its
/// terms, and scores accumulate across clauses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    clauses: Vec<String>,
}

impl Query {
    /// Parse a raw query string.
    ///
    /// Examples:
    /// - `"Widget"` → clauses=["widget"]
    /// - `"  render  Widget "` → clauses=["render", "widget"]
    /// - `"   "` → no clauses
    pub fn parse(raw: &str) -> Self {
        Self {
            clauses: raw.split_whitespace().map(str::to_lowercase).collect(),
        }
    }

    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}
