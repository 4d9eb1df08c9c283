//! Term matching and relevance weights.
//!
//! A query clause is compared against every indexed term. How well it matches
//! determines a quality factor that scales the term's field-weighted score.

use super::query::MatchMode;
use rapidfuzz::distance::levenshtein;

/// Calculate how well a query clause matches an index term.
///
/// Both sides are expected to be lowercase. Returns:
/// - 1.0: Exact match
/// - 0.75: Term starts with the clause
/// - 0.5: Term contains the clause
/// - 0.25: Some part of the term is within the fuzzy edit distance (fuzzy mode only)
/// - None: No match
pub(crate) fn match_quality(clause: &str, term: &str, mode: MatchMode) -> Option<f32> {
    if term == clause {
        Some(1.0)
    } else if term.starts_with(clause) {
        Some(0.75)
    } else if term.contains(clause) {
        Some(0.5)
    } else {
        match mode {
            MatchMode::Contains => None,
            MatchMode::Fuzzy { distance } => {
                contains_approximately(clause, term, distance).then_some(0.25)
            }
        }
    }
}

/// Whether any substring of `term` lies within `max_distance` edits of `clause`.
fn contains_approximately(clause: &str, term: &str, max_distance: usize) -> bool {
    let clause: Vec<char> = clause.chars().collect();
    let term: Vec<char> = term.chars().collect();

    // Clauses this short would match any term at all
    if clause.len() <= max_distance {
        return false;
    }

    let shortest = clause.len() - max_distance;
    let longest = (clause.len() + max_distance).min(term.len());

    (shortest..=longest).any(|width| {
        term.windows(width).any(|window| {
            levenshtein::distance(clause.iter().copied(), window.iter().copied()) <= max_distance
        })
    })
}

/// Inverse document frequency of a term that occurs in `doc_freq` of `total_docs` records.
///
/// Smoothed so that a term present in every record still contributes a positive weight.
pub(crate) fn inverse_document_frequency(total_docs: usize, doc_freq: usize) -> f32 {
    (1.0 + total_docs as f32 / doc_freq.max(1) as f32).ln()
}
