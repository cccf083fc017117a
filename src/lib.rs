//! # Modaics
//!
//! Garment intelligence pipeline: turns garment photos into structured,
//! decision-ready facts and ranks listings by semantic similarity.
//!
//! From one photo:
//! - zero-shot category, color, material, condition and style predictions
//! - a 512-dimensional unit-length embedding
//! - a named colour palette from k-means clustering
//! - an A-F condition grade with defects and sell/donate/recycle routing
//! - a decimal price estimate with range and explanation
//! - a sustainability score and listing suggestions
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! modaics analyze photo.jpg --brand patagonia
//! modaics discover listings.json --query "black linen dress"
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use modaics::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run(bytes: Vec<u8>) -> modaics::Result<()> {
//! let config = Config::default();
//! let provider = Arc::new(EmbeddingProvider::new(
//!     Arc::new(HashingLoader { dimension: config.provider.dimension }),
//!     config.provider.clone(),
//! ));
//!
//! let analyzer = GarmentAnalyzer::new(provider, config.colors.clone(), config.analysis.clone());
//! let analysis = analyzer.analyze_bytes(&bytes, &AnalysisHints::default()).await?;
//! println!("{} {}", analysis.estimated_price.recommended, analysis.condition_grade.grade);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - `modaics-core` - embeddings, garment records, image decoding, errors
//! - `modaics-encoder` - the shared embedding provider and zero-shot scoring
//! - `modaics-vision` - classifier, colour extractor, condition grader, routing
//! - `modaics-pricing` - decimal price estimation
//! - `modaics-discovery` - semantic discovery and similar-item ranking

pub mod analysis;
pub mod config;

pub use analysis::{sustainability_score, suggestions, AnalysisHints, BatchAnalysis, GarmentAnalysis, GarmentAnalyzer};
pub use config::{AnalysisConfig, Config, ConfigError, MAX_BATCH_IMAGES};

// Re-export core types
pub use modaics_core::{
    AttributePrediction, Embedding, Error, ExtractedColor, Garment, GarmentImage, GarmentRef, Provenance, Result,
    Story, StyleAttributes,
};

// Re-export components
pub use modaics_discovery::{CandidateFilter, DiscoveryConfig, DiscoveryPage, DiscoveryQuery, DiscoveryRanker, PageRequest};
pub use modaics_encoder::{Encoder, EncoderLoader, EmbeddingProvider, HashingEncoder, HashingLoader, ProviderConfig};
pub use modaics_pricing::{PriceEstimate, PriceRequest, PricingEngine};
pub use modaics_vision::{
    AttributeClassifier, Classification, ColorAnalysis, ColorExtractor, ColorExtractorConfig, ConditionGrade,
    ConditionGrader, Grade, Routing, RoutingAction,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AnalysisHints, Config, DiscoveryQuery, DiscoveryRanker, EmbeddingProvider, Error, Garment, GarmentAnalysis,
        GarmentAnalyzer, GarmentImage, HashingLoader, PageRequest, PriceRequest, PricingEngine, Result,
    };
}
