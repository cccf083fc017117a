//! # Modaics Encoder
//!
//! Image/text embedding for the garment pipeline:
//!
//! - [`Encoder`] / [`EncoderLoader`] - the model seam
//! - [`EmbeddingProvider`] - lazy, load-once shared access with zero-shot scoring
//! - [`HashingEncoder`] - deterministic backend needing no model weights
//!
//! ## Example
//!
//! ```rust
//! use modaics_encoder::{EmbeddingProvider, HashingLoader, ProviderConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> modaics_core::Result<()> {
//! let provider = EmbeddingProvider::new(
//!     Arc::new(HashingLoader { dimension: 512 }),
//!     ProviderConfig::default(),
//! );
//! let query = provider.encode_text("vintage denim jacket").await?;
//! assert_eq!(query.dim(), 512);
//! # Ok(())
//! # }
//! ```

pub mod encoder;
pub mod hashing;
pub mod provider;
pub mod zero_shot;

pub use encoder::{Encoder, EncoderLoader, PreloadedEncoder};
pub use hashing::{HashingEncoder, HashingLoader};
pub use provider::{describe_garment, EmbeddingProvider, ProviderConfig, FALLBACK_DESCRIPTION, MAX_CACHED_PROMPTS};
pub use zero_shot::{PromptScore, DEFAULT_LOGIT_SCALE};
