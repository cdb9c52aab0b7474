//! Corpus data model and the article-index interface.
//!
//! [`Article`] is the indexed unit of the source document. The index itself
//! (embedding model, nearest-neighbor store, ingestion) lives outside this
//! crate and is consumed through the [`ArticleIndex`] trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Content flags computed at ingestion time.
///
/// Cheap boolean signals over the article body, stored alongside the article
/// so downstream consumers can badge results without re-scanning content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFlags {
    /// The article mentions a fine or sanction.
    pub mentions_penalty: bool,
    /// The article states a prohibition.
    pub mentions_prohibition: bool,
    /// The article is a definition.
    pub is_definition: bool,
}

/// Metadata attached to an indexed article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    /// Article number within the source law (the stable dedup key).
    pub article_number: String,
    /// Article title.
    pub title: String,
    /// Chapter the article belongs to, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    /// Section within the chapter, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Source law identifier (e.g. "Ley 769 de 2002").
    pub source_law: String,
    /// Ingestion-time content flags.
    #[serde(default)]
    pub flags: ContentFlags,
}

/// An indexed unit of the statutory corpus.
///
/// Immutable once indexed. The index owns the canonical copy; search results
/// carry value copies that the caller owns outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Stable identifier assigned at ingestion.
    pub id: String,
    /// Free-text article content.
    pub content: String,
    /// Article metadata.
    pub metadata: ArticleMetadata,
}

/// An article returned by the nearest-neighbor index with its raw distance.
///
/// The search engine converts `distance` to a cosine similarity via
/// `1 - distance`; the trait deliberately exposes the index-native value.
#[derive(Debug, Clone)]
pub struct IndexHit {
    /// The matched article, copied out of the index.
    pub article: Article,
    /// Index-native distance (cosine convention, lower is closer).
    pub distance: f64,
}

/// Read-only interface to the external article index.
///
/// Implementations wrap the embedding service and vector store and are
/// expected to apply their own call timeouts. Both methods are read-only;
/// index building is out of scope for this crate.
#[async_trait]
pub trait ArticleIndex: Send + Sync {
    /// Returns the `top_k` nearest articles to `text` with raw distances.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::VectorIndex`] on lookup failure or
    /// [`SearchError::IndexUnavailable`] when the index is not connected.
    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<IndexHit>, SearchError>;

    /// Returns every article in the corpus, for the lexical pass.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::CorpusScan`] on scan failure.
    async fn scan_all(&self) -> Result<Vec<Article>, SearchError>;
}
