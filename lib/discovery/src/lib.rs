//! # Modaics Discovery
//!
//! Semantic discovery over garment listings:
//!
//! - Free-text queries are encoded and compared with stored embeddings;
//!   listings without one fall back to keyword scoring
//! - Similar-item lookup from a source garment's embedding
//! - Every result carries up to three human-readable reasons
//! - Results are filtered, thresholded, sorted and paginated, with a
//!   [`DiscoveryStats`] summary per query

pub mod config;
pub mod query;
pub mod ranker;
pub mod reasons;

pub use config::DiscoveryConfig;
pub use query::{CandidateFilter, DiscoveryPage, DiscoveryQuery, DiscoveryResult, DiscoveryStats, PageRequest};
pub use ranker::{DiscoveryRanker, RECENCY_SIMILARITY};
pub use reasons::{query_reasons, similar_reasons, text_similarity};
