//! Hybrid search over the statutory corpus.
//!
//! Fuses two independent retrieval channels, nearest-neighbor lookup
//! against the external index and a synonym-expanded lexical scan, into a
//! single ranked, deduplicated, threshold-filtered result set. The relaxed
//! vector threshold plus the lexical channel compensates for embedding
//! models under-recalling domain-specific legal phrasing.

pub mod engine;
pub mod keyword;
pub mod result;
pub mod synonyms;

pub use engine::{FallbackPolicy, HybridSearchEngine};
pub use result::{Origin, SearchResponse, SearchResult};
pub use synonyms::SynonymTable;
