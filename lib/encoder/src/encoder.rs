//! Encoder seams
//!
//! An [`Encoder`] is a loaded image/text model. It is synchronous and
//! CPU/GPU bound; [`crate::EmbeddingProvider`] takes care of moving calls off
//! the async scheduler. An [`EncoderLoader`] performs the expensive one-time
//! initialization and is only ever invoked by the provider.

use crate::zero_shot::DEFAULT_LOGIT_SCALE;
use modaics_core::{Embedding, GarmentImage, Result};
use std::sync::Arc;

/// A loaded image/text encoder producing unit-norm embeddings in a shared space
///
/// # Custom implementation
///
/// ```
/// use modaics_core::{Embedding, GarmentImage, Result};
/// use modaics_encoder::Encoder;
///
/// struct ConstantEncoder;
///
/// impl Encoder for ConstantEncoder {
///     fn dimension(&self) -> usize {
///         4
///     }
///
///     fn encode_image(&self, _image: &GarmentImage) -> Result<Embedding> {
///         Embedding::new(vec![1.0, 0.0, 0.0, 0.0])
///     }
///
///     fn encode_text(&self, _text: &str) -> Result<Embedding> {
///         Embedding::new(vec![0.0, 1.0, 0.0, 0.0])
///     }
/// }
/// ```
pub trait Encoder: Send + Sync {
    /// Output dimension of both towers
    fn dimension(&self) -> usize;

    fn encode_image(&self, image: &GarmentImage) -> Result<Embedding>;

    fn encode_text(&self, text: &str) -> Result<Embedding>;

    /// Temperature applied to cosine similarities before the zero-shot softmax
    fn logit_scale(&self) -> f32 {
        DEFAULT_LOGIT_SCALE
    }

    /// Identifier for logs
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Performs the expensive model initialization
pub trait EncoderLoader: Send + Sync {
    fn load(&self) -> Result<Arc<dyn Encoder>>;
}

impl<F> EncoderLoader for F
where
    F: Fn() -> Result<Arc<dyn Encoder>> + Send + Sync,
{
    fn load(&self) -> Result<Arc<dyn Encoder>> {
        self()
    }
}

/// Loader for an encoder that was constructed up front
pub struct PreloadedEncoder(pub Arc<dyn Encoder>);

impl EncoderLoader for PreloadedEncoder {
    fn load(&self) -> Result<Arc<dyn Encoder>> {
        Ok(self.0.clone())
    }
}
