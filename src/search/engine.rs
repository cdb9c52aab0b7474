//! Hybrid search engine: vector + lexical fusion with degradation policy.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::corpus::ArticleIndex;
use crate::error::SearchError;

use super::keyword::keyword_results;
use super::result::{Origin, SearchResponse, SearchResult};
use super::synonyms::SynonymTable;

/// Hard floor applied to the relaxed vector threshold and to the first
/// fallback filter.
const MIN_CONFIDENCE_THRESHOLD: f64 = 0.2;

/// How much the caller's threshold is relaxed for the vector pass. Recall is
/// deliberately widened before fusion so the stricter keyword channel has
/// candidates to rescue.
const VECTOR_THRESHOLD_RELAXATION: f64 = 0.2;

/// What to do when no fused candidate clears the caller's threshold.
///
/// The original deployment always fell through to the single best candidate;
/// whether that is graceful degradation or a precision bug depends on the
/// corpus, so the cascade is configurable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Retry at the fixed floor threshold, then return the top candidate
    /// regardless of score.
    #[default]
    FloorThenBest,
    /// Retry at the fixed floor threshold only; may return nothing.
    FloorOnly,
    /// No fallback: an empty filtered set stays empty.
    Disabled,
}

impl FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "floor-then-best" => Ok(Self::FloorThenBest),
            "floor-only" => Ok(Self::FloorOnly),
            "disabled" => Ok(Self::Disabled),
            other => Err(format!("unknown fallback policy '{other}'")),
        }
    }
}

/// Fuses nearest-neighbor and lexical retrieval into one ranked result set.
///
/// Read-only over its collaborators; safe to share across concurrent
/// sessions behind an [`Arc`].
pub struct HybridSearchEngine {
    index: Arc<dyn ArticleIndex>,
    synonyms: SynonymTable,
    fallback: FallbackPolicy,
}

impl HybridSearchEngine {
    /// Creates an engine over the given index with the default synonym table
    /// and fallback policy.
    #[must_use]
    pub fn new(index: Arc<dyn ArticleIndex>) -> Self {
        Self {
            index,
            synonyms: SynonymTable::default(),
            fallback: FallbackPolicy::default(),
        }
    }

    /// Replaces the synonym table.
    #[must_use]
    pub fn with_synonyms(mut self, synonyms: SynonymTable) -> Self {
        self.synonyms = synonyms;
        self
    }

    /// Replaces the fallback policy.
    #[must_use]
    pub const fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Runs a hybrid search.
    ///
    /// # Steps
    ///
    /// 1. Vector lookup for `2 × desired_count` candidates at a relaxed
    ///    threshold (`max(0.2, confidence_threshold - 0.2)`).
    /// 2. Synonym-expanded lexical scan of the full corpus.
    /// 3. Max-merge fusion deduplicated by article number.
    /// 4. Sort by descending score.
    /// 5. Threshold filter with the configured fallback cascade.
    /// 6. Truncate to `desired_count`.
    ///
    /// A lexical-pass failure degrades to vector-only results. A vector-pass
    /// failure is fatal to the call.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] when the vector lookup fails.
    pub async fn search(
        &self,
        query: &str,
        desired_count: usize,
        confidence_threshold: f64,
    ) -> Result<SearchResponse, SearchError> {
        let start = Instant::now();

        let vector = self
            .vector_results(query, desired_count, confidence_threshold)
            .await?;

        let keyword = match self.index.scan_all().await {
            Ok(articles) => keyword_results(&articles, query, &self.synonyms),
            Err(e) => {
                warn!(error = %e, "lexical pass failed, degrading to vector-only results");
                Vec::new()
            }
        };

        debug!(
            query,
            vector_candidates = vector.len(),
            keyword_candidates = keyword.len(),
            "fusing retrieval channels"
        );

        let fused = fuse(vector, keyword);
        let mut kept = select(&fused, confidence_threshold, self.fallback);
        kept.truncate(desired_count);

        Ok(SearchResponse {
            query: query.to_string(),
            total_found: kept.len(),
            results: kept,
            elapsed_seconds: start.elapsed().as_secs_f64(),
        })
    }

    /// Vector pass: `2 × desired_count` candidates filtered at the relaxed
    /// threshold, distances converted to cosine similarity.
    async fn vector_results(
        &self,
        query: &str,
        desired_count: usize,
        confidence_threshold: f64,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let relaxed = (confidence_threshold - VECTOR_THRESHOLD_RELAXATION)
            .max(MIN_CONFIDENCE_THRESHOLD);

        let hits = self.index.query(query, desired_count * 2).await?;

        Ok(hits
            .into_iter()
            .enumerate()
            .filter_map(|(i, hit)| {
                let similarity = 1.0 - hit.distance;
                (similarity >= relaxed).then(|| SearchResult {
                    article: hit.article,
                    score: similarity,
                    origin: Origin::Vector,
                    rank: i + 1,
                })
            })
            .collect())
    }
}

impl std::fmt::Debug for HybridSearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridSearchEngine")
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

/// Max-merge fusion: concatenates both channels, deduplicates by article
/// number keeping the higher-scoring entry (ties keep the first seen), and
/// sorts by descending score.
///
/// A document found by both channels keeps its best single-channel score;
/// duplicate scores are never summed.
fn fuse(vector: Vec<SearchResult>, keyword: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut merged: Vec<SearchResult> = Vec::new();
    let mut by_number: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for candidate in vector.into_iter().chain(keyword) {
        let number = candidate.article.metadata.article_number.clone();
        match by_number.get(&number) {
            Some(&i) => {
                if candidate.score > merged[i].score {
                    merged[i] = candidate;
                }
            }
            None => {
                by_number.insert(number, merged.len());
                merged.push(candidate);
            }
        }
    }

    merged.sort_by(|a, b| b.score.total_cmp(&a.score));
    merged
}

/// Threshold filter with the fallback cascade.
///
/// Never returns an empty set from a non-empty fused list under
/// [`FallbackPolicy::FloorThenBest`].
fn select(
    fused: &[SearchResult],
    confidence_threshold: f64,
    fallback: FallbackPolicy,
) -> Vec<SearchResult> {
    let above = |threshold: f64| -> Vec<SearchResult> {
        fused
            .iter()
            .filter(|r| r.score >= threshold)
            .cloned()
            .collect()
    };

    let kept = above(confidence_threshold);
    if !kept.is_empty() || fused.is_empty() {
        return kept;
    }

    let floored = match fallback {
        FallbackPolicy::Disabled => return kept,
        FallbackPolicy::FloorOnly | FallbackPolicy::FloorThenBest => {
            above(MIN_CONFIDENCE_THRESHOLD)
        }
    };
    if !floored.is_empty() || fallback == FallbackPolicy::FloorOnly {
        return floored;
    }

    // Top-1 regardless of threshold: the answer composer always gets at
    // least one citation when the corpus holds anything related.
    fused.first().cloned().into_iter().collect()
}
