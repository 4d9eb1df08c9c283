//! Weighted inverted index over the catalog, built in resumable batches.

use crate::catalog::Catalog;
use ahash::AHashMap;
use std::{sync::Arc, time::Instant};

use super::query::{MatchMode, Query};
use super::scoring::{inverse_document_frequency, match_quality};
use super::tokenize::tokenize;

/// Which record field a term came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Parent,
}

/// Per-field weights applied at query time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBoosts {
    pub name: f32,
    pub parent: f32,
}

impl FieldBoosts {
    fn get(self, field: Field) -> f32 {
        match field {
            Field::Name => self.name,
            Field::Parent => self.parent,
        }
    }
}

impl Default for FieldBoosts {
    fn default() -> Self {
        Self {
            name: 10.0,
            parent: 1.0,
        }
    }
}

/// One occurrence list entry: a record position, the field, and how often the term occurs there.
#[derive(Debug, Clone, Copy)]
struct Posting {
    doc: usize,
    field: Field,
    count: u32,
}

/// A ranked reference returned by [`SearchIndex::search`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// The record id, resolved back through [`Catalog::get`].
    pub id: u32,
    pub score: f32,
}

/// A read-only, queryable index. Only [`IndexBuilder::finish`] creates one.
#[derive(Debug)]
pub struct SearchIndex {
    /// Sorted so that scans and tie-breaks are deterministic
    vocabulary: Vec<String>,
    /// Parallel to `vocabulary`
    postings: Vec<Vec<Posting>>,
    /// Parallel to `vocabulary`
    idf: Vec<f32>,
    /// Record id by catalog position
    refs: Vec<u32>,
    boosts: FieldBoosts,
}

impl SearchIndex {
    /// Searches for records matching the query.
    ///
    /// Returns every matching record, highest score first; equal scores keep catalog order.
    ///
    /// Per clause, each field of a record contributes its best-matching term only, so
    /// the split and verbatim terms of one word ("type", "__type") never add up.
    /// Contributions are summed across fields and clauses.
    pub fn search(&self, query: &Query, mode: MatchMode) -> Vec<SearchHit> {
        let mut scores: AHashMap<usize, f32> = AHashMap::new();

        for clause in query.clauses() {
            let mut best: AHashMap<(usize, Field), f32> = AHashMap::new();
            for (term_idx, term) in self.vocabulary.iter().enumerate() {
                let Some(quality) = match_quality(clause, term, mode) else {
                    continue;
                };
                let idf = self.idf[term_idx];
                for posting in &self.postings[term_idx] {
                    let tf = 1.0 + (posting.count as f32).ln();
                    let score = self.boosts.get(posting.field) * idf * quality * tf;
                    let slot = best.entry((posting.doc, posting.field)).or_insert(0.0);
                    *slot = slot.max(score);
                }
            }
            for ((doc, _), score) in best {
                *scores.entry(doc).or_insert(0.0) += score;
            }
        }

        let mut ranked: Vec<_> = scores.into_iter().collect();
        ranked.sort_by(|(doc_a, a), (doc_b, b)| b.total_cmp(a).then(doc_a.cmp(doc_b)));

        ranked
            .into_iter()
            .map(|(doc, score)| SearchHit {
                id: self.refs[doc],
                score,
            })
            .collect()
    }

    /// Get the number of unique terms in the index
    pub fn term_count(&self) -> usize {
        self.vocabulary.len()
    }

    /// Get the number of records in the index
    pub fn document_count(&self) -> usize {
        self.refs.len()
    }
}

/// Progress report from [`IndexBuilder::build_next_batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// More records remain; call again after yielding.
    More { indexed: usize, total: usize },
    /// Every record has been visited; call [`IndexBuilder::finish`].
    Done,
}

/// Incrementally indexes a catalog, a fixed number of records per call.
///
/// Records are visited exactly once, in catalog order. The index only becomes
/// queryable through [`finish`](Self::finish), after the last record.
pub struct IndexBuilder {
    catalog: Arc<Catalog>,
    batch_size: usize,
    boosts: FieldBoosts,
    /// Next catalog position to index
    position: usize,
    /// Map from term to its postings, in insertion order per term
    terms: AHashMap<String, Vec<Posting>>,
    started: Instant,
}

impl std::fmt::Debug for IndexBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexBuilder")
            .field("position", &self.position)
            .field("total", &self.catalog.len())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl IndexBuilder {
    /// Create a builder. A `batch_size` of zero is treated as one.
    pub fn new(catalog: Arc<Catalog>, batch_size: usize, boosts: FieldBoosts) -> Self {
        Self {
            catalog,
            batch_size: batch_size.max(1),
            boosts,
            position: 0,
            terms: AHashMap::new(),
            started: Instant::now(),
        }
    }

    /// Index the next batch of records.
    pub fn build_next_batch(&mut self) -> BuildStatus {
        let catalog = Arc::clone(&self.catalog);
        let total = catalog.len();
        let end = (self.position + self.batch_size).min(total);

        for doc in self.position..end {
            let record = &catalog.rows()[doc];
            self.add_field(&record.name, doc, Field::Name);
            if let Some(parent) = &record.parent {
                self.add_field(parent, doc, Field::Parent);
            }
        }
        self.position = end;

        if self.is_done() {
            BuildStatus::Done
        } else {
            tracing::trace!("Indexed {}/{} records", self.position, total);
            BuildStatus::More {
                indexed: self.position,
                total,
            }
        }
    }

    /// Whether every record has been visited.
    pub fn is_done(&self) -> bool {
        self.position >= self.catalog.len()
    }

    /// Commit the index. Returns `None` while records remain.
    pub fn finish(self) -> Option<SearchIndex> {
        if !self.is_done() {
            return None;
        }

        let total_docs = self.catalog.len();
        let refs = self.catalog.rows().iter().map(|row| row.id).collect();

        let mut entries: Vec<_> = self.terms.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut vocabulary = Vec::with_capacity(entries.len());
        let mut postings = Vec::with_capacity(entries.len());
        let mut idf = Vec::with_capacity(entries.len());
        for (term, term_postings) in entries {
            let mut docs: Vec<usize> = term_postings.iter().map(|p| p.doc).collect();
            docs.dedup();
            idf.push(inverse_document_frequency(total_docs, docs.len()));
            vocabulary.push(term);
            postings.push(term_postings);
        }

        let index = SearchIndex {
            vocabulary,
            postings,
            idf,
            refs,
            boosts: self.boosts,
        };

        tracing::info!(
            "Built search index: {} unique terms, {} documents in {:?}",
            index.term_count(),
            index.document_count(),
            self.started.elapsed()
        );

        Some(index)
    }

    /// Tokenize one field of one record and record its postings.
    fn add_field(&mut self, text: &str, doc: usize, field: Field) {
        for term in tokenize(text) {
            let postings = self.terms.entry(term).or_default();
            match postings.last_mut() {
                Some(last) if last.doc == doc && last.field == field => last.count += 1,
                _ => postings.push(Posting {
                    doc,
                    field,
                    count: 1,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogRecord;
    use assert2::check;
    use std::collections::HashMap;

    fn record(id: u32, name: &str, parent: Option<&str>) -> CatalogRecord {
        CatalogRecord {
            id,
            kind: 0,
            name: name.to_string(),
            url: format!("{}.html", name),
            classes: String::new(),
            parent: parent.map(str::to_string),
        }
    }

    fn catalog(rows: Vec<CatalogRecord>) -> Arc<Catalog> {
        Arc::new(Catalog::new(rows, HashMap::new()).unwrap())
    }

    fn build(catalog: Arc<Catalog>, batch_size: usize) -> SearchIndex {
        let mut builder = IndexBuilder::new(catalog, batch_size, FieldBoosts::default());
        while builder.build_next_batch() != BuildStatus::Done {}
        builder.finish().unwrap()
    }

    #[test]
    fn test_batches_cover_catalog_once() {
        let rows = (0..250).map(|i| record(i, &format!("item{}", i), None)).collect();
        let mut builder = IndexBuilder::new(catalog(rows), 100, FieldBoosts::default());

        check!(builder.build_next_batch() == BuildStatus::More { indexed: 100, total: 250 });
        check!(builder.build_next_batch() == BuildStatus::More { indexed: 200, total: 250 });
        check!(builder.build_next_batch() == BuildStatus::Done);

        let index = builder.finish().unwrap();
        check!(index.document_count() == 250);
        // each name is its own unique term
        check!(index.term_count() == 250);
    }

    #[test]
    fn test_finish_before_done_is_none() {
        let rows = (0..3).map(|i| record(i, &format!("n{}", i), None)).collect();
        let mut builder = IndexBuilder::new(catalog(rows), 1, FieldBoosts::default());
        check!(matches!(builder.build_next_batch(), BuildStatus::More { .. }));
        check!(builder.finish().is_none());
    }

    #[test]
    fn test_empty_catalog_completes_immediately() {
        let mut builder = IndexBuilder::new(catalog(vec![]), 100, FieldBoosts::default());
        check!(builder.build_next_batch() == BuildStatus::Done);
        let index = builder.finish().unwrap();
        check!(index.document_count() == 0);
        check!(index.search(&Query::parse("x"), MatchMode::Contains).is_empty());
    }

    #[test]
    fn test_name_outranks_parent() {
        let index = build(
            catalog(vec![
                record(1, "render", Some("Widget")),
                record(2, "Widget", None),
            ]),
            100,
        );
        let hits = index.search(&Query::parse("widget"), MatchMode::Contains);
        let ids: Vec<u32> = hits.iter().map(|h| h.id).collect();
        check!(ids == vec![2, 1]);
    }

    #[test]
    fn test_exact_term_outranks_prefix() {
        let index = build(
            catalog(vec![record(1, "renderer", None), record(2, "render", None)]),
            100,
        );
        let hits = index.search(&Query::parse("render"), MatchMode::Contains);
        check!(hits[0].id == 2);
        check!(hits.len() == 2);
    }

    #[test]
    fn test_contains_misses_typo_but_fuzzy_finds_it() {
        let index = build(catalog(vec![record(5, "Widget", None)]), 100);
        let query = Query::parse("wdget");
        check!(index.search(&query, MatchMode::Contains).is_empty());
        let hits = index.search(&query, MatchMode::Fuzzy { distance: 1 });
        check!(hits.len() == 1);
        check!(hits[0].id == 5);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let index = build(catalog(vec![record(1, "HttpServer", None)]), 100);
        let upper = index.search(&Query::parse("SERVER"), MatchMode::Contains);
        let lower = index.search(&Query::parse("server"), MatchMode::Contains);
        check!(upper == lower);
        check!(upper.len() == 1);
    }

    #[test]
    fn test_underscored_name_does_not_outrank_exact_name() {
        let index = build(
            catalog(vec![record(1, "type", None), record(2, "__type", None)]),
            100,
        );

        let hits = index.search(&Query::parse("type"), MatchMode::Contains);
        let ids: Vec<u32> = hits.iter().map(|h| h.id).collect();
        check!(ids == vec![1, 2]);
        check!(hits[0].score == hits[1].score);

        let hits = index.search(&Query::parse("__type"), MatchMode::Contains);
        check!(hits.len() == 1);
        check!(hits[0].id == 2);
    }

    #[test]
    fn test_equal_scores_keep_catalog_order() {
        let index = build(
            catalog(vec![
                record(9, "alpha", None),
                record(3, "alpha", Some("x")),
                record(4, "alpha", Some("x")),
            ]),
            2,
        );
        let hits = index.search(&Query::parse("alpha"), MatchMode::Contains);
        let ids: Vec<u32> = hits.iter().map(|h| h.id).collect();
        check!(ids == vec![9, 3, 4]);
    }
}
