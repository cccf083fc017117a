//! Embedding provider
//!
//! Owns the one shared encoder. The model is loaded lazily on first use and
//! exactly once: concurrent first callers wait on the same initialization, and
//! a failed load leaves the provider unloaded so the next call retries.
//! Every inference runs on the blocking pool, gated by a semaphore and an
//! optional timeout, so request handling never stalls on model work.

use crate::encoder::{Encoder, EncoderLoader, PreloadedEncoder};
use crate::zero_shot::{self, PromptScore};
use ahash::AHashMap;
use modaics_core::{Embedding, Error, GarmentImage, Result, StyleAttributes, EMBEDDING_DIM};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OnceCell, Semaphore};
use tracing::{debug, info, warn};

/// Upper bound on cached prompt embeddings; the built-in banks need under a hundred
pub const MAX_CACHED_PROMPTS: usize = 1024;

/// Runtime settings of the embedding provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    /// Expected output dimension of the encoder
    pub dimension: usize,
    /// Inference calls allowed on the blocking pool at once
    pub max_concurrent_inference: usize,
    /// Per-call deadline; `None` disables it
    pub inference_timeout_ms: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            dimension: EMBEDDING_DIM,
            max_concurrent_inference: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            inference_timeout_ms: Some(30_000),
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(Error::InvalidConfig("dimension must be positive".to_string()));
        }
        if self.max_concurrent_inference == 0 {
            return Err(Error::InvalidConfig(
                "max_concurrent_inference must be positive".to_string(),
            ));
        }
        if self.inference_timeout_ms == Some(0) {
            return Err(Error::InvalidConfig(
                "inference_timeout_ms must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn inference_timeout(&self) -> Option<Duration> {
        self.inference_timeout_ms.map(Duration::from_millis)
    }
}

/// Shared access point to the image/text encoder
pub struct EmbeddingProvider {
    loader: Arc<dyn EncoderLoader>,
    model: OnceCell<Arc<dyn Encoder>>,
    /// Prompt text -> embedding, bounded by `MAX_CACHED_PROMPTS`
    prompt_cache: RwLock<AHashMap<String, Embedding>>,
    permits: Arc<Semaphore>,
    config: ProviderConfig,
}

impl EmbeddingProvider {
    pub fn new(loader: Arc<dyn EncoderLoader>, config: ProviderConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_inference.max(1)));
        Self {
            loader,
            model: OnceCell::new(),
            prompt_cache: RwLock::new(AHashMap::new()),
            permits,
            config,
        }
    }

    /// Provider around an already constructed encoder
    pub fn with_encoder(encoder: Arc<dyn Encoder>, config: ProviderConfig) -> Self {
        Self::new(Arc::new(PreloadedEncoder(encoder)), config)
    }

    #[inline]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Whether the model has been loaded
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Number of prompt embeddings held in the cache
    pub fn cached_prompts(&self) -> usize {
        self.prompt_cache.read().len()
    }

    /// Load the encoder if needed
    pub async fn model(&self) -> Result<Arc<dyn Encoder>> {
        let model = self
            .model
            .get_or_try_init(|| async {
                let loader = self.loader.clone();
                let started = Instant::now();
                info!("Loading encoder model");

                let encoder = tokio::task::spawn_blocking(move || loader.load())
                    .await
                    .map_err(|e| Error::ModelUnavailable(format!("model load task failed: {}", e)))?
                    .map_err(|e| {
                        warn!("Encoder model failed to load: {}", e);
                        model_fault(e)
                    })?;

                if encoder.dimension() != self.config.dimension {
                    return Err(Error::ModelUnavailable(format!(
                        "encoder produces {}-dim embeddings, expected {}",
                        encoder.dimension(),
                        self.config.dimension
                    )));
                }

                info!(
                    "Encoder '{}' loaded in {:?} (dim={})",
                    encoder.name(),
                    started.elapsed(),
                    encoder.dimension()
                );
                Ok(encoder)
            })
            .await?;
        Ok(model.clone())
    }

    /// Unit-norm image embedding
    pub async fn encode_image(&self, image: &GarmentImage) -> Result<Embedding> {
        let model = self.model().await?;
        self.image_embedding(model, image).await
    }

    /// Unit-norm text embedding
    pub async fn encode_text(&self, text: &str) -> Result<Embedding> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("text to encode is empty".to_string()));
        }
        let model = self.model().await?;
        let dimension = self.config.dimension;
        let text = text.to_string();
        self.run_blocking("text encoding", move || {
            let embedding = model.encode_text(&text).map_err(model_fault)?;
            check_dimension(embedding, dimension)
        })
        .await
    }

    /// Zero-shot scores of `image` against `prompts`, in prompt order, summing to 1
    pub async fn score(&self, image: &GarmentImage, prompts: &[&str]) -> Result<Vec<PromptScore>> {
        if prompts.is_empty() {
            return Err(Error::InvalidInput("prompt list is empty".to_string()));
        }
        let model = self.model().await?;
        let logit_scale = model.logit_scale();
        let image_embedding = self.image_embedding(model.clone(), image).await?;
        let prompt_embeddings = self.prompt_embeddings(model, prompts).await?;

        Ok(zero_shot::softmax_scores(
            &image_embedding,
            prompts,
            &prompt_embeddings,
            logit_scale,
        ))
    }

    /// Similarity of two embeddings, clamped to [0, 1]
    #[inline]
    pub fn similarity(a: &Embedding, b: &Embedding) -> f32 {
        a.similarity(b)
    }

    /// Single embedding for a garment from text, image and style hints
    ///
    /// Text and style are folded into one description. When both a
    /// description and an image are available their embeddings are averaged
    /// and renormalized. With neither, the generic description is embedded.
    pub async fn embed_garment(
        &self,
        text: Option<&str>,
        image: Option<&GarmentImage>,
        style: Option<&StyleAttributes>,
    ) -> Result<Embedding> {
        let description = describe_garment(text, style);

        match (description, image) {
            (None, None) => self.encode_text(FALLBACK_DESCRIPTION).await,
            (Some(description), None) => self.encode_text(&description).await,
            (None, Some(image)) => self.encode_image(image).await,
            (Some(description), Some(image)) => {
                let text_embedding = self.encode_text(&description).await?;
                let image_embedding = self.encode_image(image).await?;
                Embedding::mean(&[&text_embedding, &image_embedding])
            }
        }
    }

    async fn image_embedding(&self, model: Arc<dyn Encoder>, image: &GarmentImage) -> Result<Embedding> {
        let dimension = self.config.dimension;
        let image = image.clone();
        self.run_blocking("image encoding", move || {
            let embedding = model.encode_image(&image).map_err(model_fault)?;
            check_dimension(embedding, dimension)
        })
        .await
    }

    /// Embeddings for `prompts`, encoding only the ones not cached yet
    ///
    /// New prompts are cached until the cache holds `MAX_CACHED_PROMPTS`;
    /// past that they are encoded on every call.
    async fn prompt_embeddings(&self, model: Arc<dyn Encoder>, prompts: &[&str]) -> Result<Vec<Embedding>> {
        let missing: Vec<String> = {
            let cache = self.prompt_cache.read();
            let mut missing: Vec<String> = Vec::new();
            for prompt in prompts {
                if !cache.contains_key(*prompt) && !missing.iter().any(|m| m.as_str() == *prompt) {
                    missing.push((*prompt).to_string());
                }
            }
            missing
        };

        let mut fresh: AHashMap<String, Embedding> = AHashMap::new();
        if !missing.is_empty() {
            debug!("Encoding {} uncached prompts", missing.len());
            let dimension = self.config.dimension;
            let encoded = self
                .run_blocking("prompt encoding", move || {
                    missing
                        .into_iter()
                        .map(|prompt| {
                            let embedding = model.encode_text(&prompt).map_err(model_fault)?;
                            Ok((prompt, check_dimension(embedding, dimension)?))
                        })
                        .collect::<Result<Vec<_>>>()
                })
                .await?;

            let mut cache = self.prompt_cache.write();
            for (prompt, embedding) in encoded {
                if cache.len() < MAX_CACHED_PROMPTS {
                    cache.insert(prompt.clone(), embedding.clone());
                }
                fresh.insert(prompt, embedding);
            }
        }

        let cache = self.prompt_cache.read();
        prompts
            .iter()
            .map(|prompt| {
                fresh
                    .get(*prompt)
                    .or_else(|| cache.get(*prompt))
                    .cloned()
                    .ok_or_else(|| Error::ModelUnavailable(format!("prompt '{}' was not encoded", prompt)))
            })
            .collect()
    }

    /// Run model work on the blocking pool under the concurrency limit and deadline
    async fn run_blocking<T, F>(&self, operation: &'static str, work: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        // The permit travels with the work so a timed-out call still counts
        // against the limit until the model returns.
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::ModelUnavailable("inference pool is closed".to_string()))?;

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            work()
        });

        let joined = match self.config.inference_timeout() {
            Some(deadline) => tokio::time::timeout(deadline, handle).await.map_err(|_| {
                warn!("{} exceeded {:?}", operation, deadline);
                Error::ModelUnavailable(format!("{} timed out after {:?}", operation, deadline))
            })?,
            None => handle.await,
        };

        joined.map_err(|e| Error::ModelUnavailable(format!("{} task failed: {}", operation, e)))?
    }
}

impl std::fmt::Debug for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingProvider")
            .field("loaded", &self.is_loaded())
            .field("cached_prompts", &self.cached_prompts())
            .field("config", &self.config)
            .finish()
    }
}

/// Any failure inside the model surfaces as `ModelUnavailable`
fn model_fault(err: Error) -> Error {
    match err {
        Error::ModelUnavailable(msg) => Error::ModelUnavailable(msg),
        other => Error::ModelUnavailable(other.to_string()),
    }
}

fn check_dimension(embedding: Embedding, expected: usize) -> Result<Embedding> {
    if embedding.dim() != expected {
        return Err(Error::ModelUnavailable(format!(
            "encoder returned {}-dim embedding, expected {}",
            embedding.dim(),
            expected
        )));
    }
    Ok(embedding)
}

/// Description embedded when a garment has nothing else to go on
pub const FALLBACK_DESCRIPTION: &str = "a garment";

/// Natural-language description of a garment for the text tower
///
/// Returns `None` when neither text nor any style attribute is present.
pub fn describe_garment(text: Option<&str>, style: Option<&StyleAttributes>) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
        parts.push(text.to_string());
    }

    if let Some(style) = style.filter(|s| !s.is_empty()) {
        let mut clauses: Vec<String> = Vec::new();
        if !style.colors.is_empty() {
            clauses.push(format!("colors: {}", style.colors.join(", ")));
        }
        if !style.patterns.is_empty() {
            clauses.push(format!("patterns: {}", style.patterns.join(", ")));
        }
        if !style.style_tags.is_empty() {
            clauses.push(format!("style: {}", style.style_tags.join(", ")));
        }
        if let Some(season) = style.season.as_deref().filter(|s| !s.is_empty()) {
            clauses.push(format!("season: {}", season));
        }
        if !clauses.is_empty() {
            parts.push(format!("A garment with {}", clauses.join(", ")));
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(". "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::HashingEncoder;
    use image::{Rgb, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Encoder with fixed outputs: images map to axis 0, text to a per-prompt axis
    struct AxisEncoder;

    impl Encoder for AxisEncoder {
        fn dimension(&self) -> usize {
            4
        }

        fn encode_image(&self, _image: &GarmentImage) -> Result<Embedding> {
            Embedding::new(vec![1.0, 0.0, 0.0, 0.0])
        }

        fn encode_text(&self, text: &str) -> Result<Embedding> {
            match text {
                "match" => Embedding::new(vec![1.0, 0.0, 0.0, 0.0]),
                "partial" => Embedding::new(vec![0.5, 0.5, 0.0, 0.0]),
                _ => Embedding::new(vec![0.0, 0.0, 1.0, 0.0]),
            }
        }
    }

    struct SlowEncoder;

    impl Encoder for SlowEncoder {
        fn dimension(&self) -> usize {
            4
        }

        fn encode_image(&self, _image: &GarmentImage) -> Result<Embedding> {
            std::thread::sleep(Duration::from_millis(300));
            Embedding::new(vec![1.0, 0.0, 0.0, 0.0])
        }

        fn encode_text(&self, _text: &str) -> Result<Embedding> {
            Embedding::new(vec![1.0, 0.0, 0.0, 0.0])
        }
    }

    fn config(dimension: usize) -> ProviderConfig {
        ProviderConfig {
            dimension,
            max_concurrent_inference: 2,
            inference_timeout_ms: Some(5_000),
        }
    }

    fn image() -> GarmentImage {
        GarmentImage::from_rgb(RgbImage::from_pixel(8, 8, Rgb([10, 20, 200])))
    }

    #[tokio::test]
    async fn test_score_prefers_matching_prompt() {
        let provider = EmbeddingProvider::with_encoder(Arc::new(AxisEncoder), config(4));
        let scores = provider
            .score(&image(), &["other", "match", "partial"])
            .await
            .unwrap();

        assert_eq!(scores.len(), 3);
        assert_eq!(scores[1].prompt, "match");
        assert!(scores[1].score > scores[2].score);
        assert!(scores[2].score > scores[0].score);
        let total: f32 = scores.iter().map(|s| s.score).sum();
        assert!((total - 1.0).abs() < 1e-4);
        assert_eq!(provider.cached_prompts(), 3);
    }

    #[tokio::test]
    async fn test_prompt_cache_is_bounded() {
        let provider = EmbeddingProvider::with_encoder(Arc::new(AxisEncoder), config(4));
        let prompts: Vec<String> = (0..MAX_CACHED_PROMPTS + 10).map(|i| format!("prompt {}", i)).collect();
        let refs: Vec<&str> = prompts.iter().map(String::as_str).collect();

        let scores = provider.score(&image(), &refs).await.unwrap();
        assert_eq!(scores.len(), refs.len());
        assert_eq!(provider.cached_prompts(), MAX_CACHED_PROMPTS);

        let again = provider.score(&image(), &["match", "partial"]).await.unwrap();
        assert_eq!(again[0].prompt, "match");
        assert_eq!(provider.cached_prompts(), MAX_CACHED_PROMPTS);
    }

    #[tokio::test]
    async fn test_encode_text_does_not_fill_prompt_cache() {
        let provider = EmbeddingProvider::with_encoder(Arc::new(AxisEncoder), config(4));
        provider.encode_text("black silk slip dress").await.unwrap();
        provider.encode_text("chunky wool coat").await.unwrap();
        assert_eq!(provider.cached_prompts(), 0);
    }

    #[tokio::test]
    async fn test_model_loads_once_under_concurrency() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();
        let loader = move || -> Result<Arc<dyn Encoder>> {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            Ok(Arc::new(AxisEncoder))
        };
        let provider = Arc::new(EmbeddingProvider::new(Arc::new(loader), config(4)));
        assert!(!provider.is_loaded());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let provider = provider.clone();
            handles.push(tokio::spawn(async move { provider.encode_text("match").await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(provider.is_loaded());
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let loader = move || -> Result<Arc<dyn Encoder>> {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "weights missing")))
            } else {
                Ok(Arc::new(AxisEncoder))
            }
        };
        let provider = EmbeddingProvider::new(Arc::new(loader), config(4));

        let err = provider.encode_text("match").await.unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
        assert!(!provider.is_loaded());

        provider.encode_text("match").await.unwrap();
        assert!(provider.is_loaded());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_model_unavailable() {
        let provider = EmbeddingProvider::with_encoder(Arc::new(AxisEncoder), config(8));
        let err = provider.encode_image(&image()).await.unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
    }

    #[tokio::test]
    async fn test_inference_timeout() {
        let provider = EmbeddingProvider::with_encoder(
            Arc::new(SlowEncoder),
            ProviderConfig {
                dimension: 4,
                max_concurrent_inference: 1,
                inference_timeout_ms: Some(20),
            },
        );
        let err = provider.encode_image(&image()).await.unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_empty_inputs_rejected() {
        let provider = EmbeddingProvider::with_encoder(Arc::new(AxisEncoder), config(4));
        assert!(matches!(provider.encode_text("  ").await, Err(Error::InvalidInput(_))));
        assert!(matches!(provider.score(&image(), &[]).await, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_embed_garment_without_inputs_uses_fallback() {
        let encoder = Arc::new(HashingEncoder::new(64).unwrap());
        let provider = EmbeddingProvider::with_encoder(encoder, config(64));
        let blank = provider.embed_garment(Some("   "), None, None).await.unwrap();
        let fallback = provider.encode_text(FALLBACK_DESCRIPTION).await.unwrap();
        assert_eq!(blank, fallback);
    }

    #[tokio::test]
    async fn test_embed_garment_combines_text_and_image() {
        let encoder = Arc::new(HashingEncoder::new(64).unwrap());
        let provider = EmbeddingProvider::with_encoder(encoder, config(64));
        let style = StyleAttributes {
            colors: vec!["blue".to_string()],
            ..Default::default()
        };

        let combined = provider
            .embed_garment(Some("linen shirt"), Some(&image()), Some(&style))
            .await
            .unwrap();
        let text_only = provider
            .embed_garment(Some("linen shirt"), None, Some(&style))
            .await
            .unwrap();

        let norm: f32 = combined.as_slice().iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
        assert!(combined.similarity(&text_only) > 0.0);
        assert_ne!(combined, text_only);
    }

    #[test]
    fn test_describe_garment() {
        let style = StyleAttributes {
            colors: vec!["black".to_string(), "white".to_string()],
            patterns: vec![],
            style_tags: vec!["minimalist".to_string()],
            season: Some("autumn".to_string()),
        };
        assert_eq!(
            describe_garment(None, Some(&style)).unwrap(),
            "A garment with colors: black, white, style: minimalist, season: autumn"
        );
        assert_eq!(
            describe_garment(Some("vintage coat"), None).unwrap(),
            "vintage coat"
        );
        assert!(describe_garment(Some("   "), Some(&StyleAttributes::default())).is_none());
    }

    #[test]
    fn test_config_validation() {
        assert!(ProviderConfig::default().validate().is_ok());
        let bad = ProviderConfig {
            max_concurrent_inference: 0,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(Error::InvalidConfig(_))));
    }
}
