//! # Modaics Vision
//!
//! Per-photo garment analysis:
//!
//! - [`AttributeClassifier`] - zero-shot category, color, material, condition and style
//! - [`ColorExtractor`] - k-means palette extraction with fashion colour names
//! - [`ConditionGrader`] - A-F grading, defect detection and sell/donate/recycle routing
//! - [`aggregate()`] - consensus over several photos of one garment
//!
//! Everything model-backed goes through a shared
//! [`modaics_encoder::EmbeddingProvider`].

pub mod aggregate;
pub mod classifier;
pub mod color;
pub mod condition;
pub mod kmeans;
pub mod palette;
pub mod prompts;
pub mod routing;

pub use aggregate::{aggregate, AggregatedPredictions};
pub use classifier::{AttributeClassifier, Classification};
pub use color::{ColorAnalysis, ColorExtractor, ColorExtractorConfig};
pub use condition::{ConditionGrade, ConditionGrader, Defect, Grade, GradeAssessment, GradeInfo, GRADE_TABLE};
pub use routing::{route, Routing, RoutingAction, RoutingConfidence, ROUTING_RULES};
