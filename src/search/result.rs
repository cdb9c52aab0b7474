//! Search result types.

use serde::{Deserialize, Serialize};

use crate::corpus::Article;

/// Which retrieval channel produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Nearest-neighbor lookup against the embedding index.
    Vector,
    /// Synonym-expanded lexical scan of the full corpus.
    Keyword,
}

/// A single matched article with its similarity score.
///
/// Created fresh per query and owned by the caller after return. The score
/// is always in `[0, 1]`: cosine similarity (`1 - distance`) for the vector
/// channel, normalized term-hit ratio for the keyword channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matched article, copied by value out of the index.
    pub article: Article,
    /// Similarity score in `[0, 1]`.
    pub score: f64,
    /// Retrieval channel that produced this entry.
    pub origin: Origin,
    /// 1-based position within the producing channel (0 for keyword hits,
    /// which are unranked until fusion).
    pub rank: usize,
}

/// The outcome of one search invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The original query text.
    pub query: String,
    /// Number of results returned (post-truncation).
    pub total_found: usize,
    /// Kept results, sorted by descending score.
    pub results: Vec<SearchResult>,
    /// Wall-clock time spent in the search call.
    pub elapsed_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{ArticleMetadata, ContentFlags};

    fn sample_article(number: &str) -> Article {
        Article {
            id: format!("art-{number}"),
            content: "contenido".to_string(),
            metadata: ArticleMetadata {
                article_number: number.to_string(),
                title: "Título".to_string(),
                chapter: None,
                section: None,
                source_law: "Ley 769 de 2002".to_string(),
                flags: ContentFlags::default(),
            },
        }
    }

    #[test]
    fn test_origin_serialization() {
        let json = serde_json::to_string(&Origin::Vector).unwrap_or_default();
        assert_eq!(json, "\"vector\"");
        let json = serde_json::to_string(&Origin::Keyword).unwrap_or_default();
        assert_eq!(json, "\"keyword\"");
    }

    #[test]
    fn test_response_serialization() {
        let response = SearchResponse {
            query: "límite de velocidad".to_string(),
            total_found: 1,
            results: vec![SearchResult {
                article: sample_article("106"),
                score: 0.82,
                origin: Origin::Vector,
                rank: 1,
            }],
            elapsed_seconds: 0.05,
        };
        let json = serde_json::to_string(&response).unwrap_or_default();
        assert!(json.contains("límite de velocidad"));
        assert!(json.contains("\"vector\""));
        assert!(json.contains("0.82"));
    }
}
