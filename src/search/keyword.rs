//! Lexical retrieval pass.
//!
//! Scans the full corpus for synonym-expanded query terms. Term hits inside
//! the first [`LEAD_WINDOW_CHARS`] characters of an article count double,
//! since article numbers and titles sit at the head of the indexed text.

use crate::corpus::Article;

use super::result::{Origin, SearchResult};
use super::synonyms::SynonymTable;

/// Characters of leading content that receive title/lead weighting.
pub(crate) const LEAD_WINDOW_CHARS: usize = 200;

/// Raw weighted hit count for one document against the expanded terms.
///
/// +2 for a term found in the lead window, +1 for a term found only in the
/// remainder. Matching is substring containment over the lowercased body,
/// so multi-word synonyms participate like any other term.
pub(crate) fn score_document(content: &str, terms: &[String]) -> u32 {
    let lower = content.to_lowercase();
    let lead: String = lower.chars().take(LEAD_WINDOW_CHARS).collect();

    let mut raw = 0;
    for term in terms {
        if lead.contains(term.as_str()) {
            raw += 2;
        } else if lower.contains(term.as_str()) {
            raw += 1;
        }
    }
    raw
}

/// Maps a raw hit count into `[0, 1]`.
///
/// A document matching every term in the lead window saturates at 1.0.
pub(crate) fn normalize_score(raw: u32, term_count: usize) -> f64 {
    (f64::from(raw) / (term_count as f64 * 2.0)).min(1.0)
}

/// Runs the lexical pass over a scanned corpus.
///
/// Expands the query through `synonyms`, scores every article, and keeps
/// those with at least one hit. Results are unranked (`rank` 0); the fusion
/// step assigns final ordering.
pub(crate) fn keyword_results(
    articles: &[Article],
    query: &str,
    synonyms: &SynonymTable,
) -> Vec<SearchResult> {
    let terms = synonyms.expand(query);

    let mut results = Vec::new();
    for article in articles {
        let raw = score_document(&article.content, &terms);
        if raw > 0 {
            results.push(SearchResult {
                article: article.clone(),
                score: normalize_score(raw, terms.len()),
                origin: Origin::Keyword,
                rank: 0,
            });
        }
    }
    results
}
