//! # Modaics Core
//!
//! Shared value types for the Modaics garment intelligence pipeline.
//!
//! - [`Embedding`] - unit-length vector, similarity by dot product
//! - [`Garment`] - read-only listing record with typed story/provenance/style
//! - [`GarmentImage`] - validated, decoded upload
//! - [`AttributePrediction`] / [`ExtractedColor`] - per-image analysis outputs
//! - [`Error`] - the pipeline error taxonomy
//!
//! ## Example
//!
//! ```rust
//! use modaics_core::Embedding;
//!
//! let a = Embedding::new(vec![1.0, 1.0, 0.0]).unwrap();
//! let b = Embedding::new(vec![1.0, 0.0, 0.0]).unwrap();
//! assert!((a.similarity(&a) - 1.0).abs() < 1e-6);
//! assert!(a.similarity(&b) > 0.7);
//! ```

pub mod attributes;
pub mod embedding;
pub mod error;
pub mod garment;
pub mod upload;

/// Dot product kernels
///
/// AVX2/FMA on x86_64, unrolled scalar elsewhere.
pub mod simd;

pub use attributes::{round3, AttributePrediction, ExtractedColor};
pub use embedding::{Embedding, EMBEDDING_DIM};
pub use error::{Error, Result};
pub use garment::{Garment, GarmentRef, Provenance, Story, StyleAttributes};
pub use upload::{GarmentImage, MAX_IMAGE_BYTES};
