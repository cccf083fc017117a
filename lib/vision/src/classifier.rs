//! Zero-shot attribute classification
//!
//! Five prompt banks scored against the same photo. The banks are independent,
//! so they are issued concurrently; the result is all five or an error.

use crate::prompts::{self, clean_label, PromptBank};
use modaics_core::{round3, AttributePrediction, GarmentImage, Result};
use modaics_encoder::zero_shot::ranked;
use modaics_encoder::EmbeddingProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Top predictions per attribute, most confident first
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub category: Vec<AttributePrediction>,
    pub color: Vec<AttributePrediction>,
    pub material: Vec<AttributePrediction>,
    pub condition: Vec<AttributePrediction>,
    pub style: Vec<AttributePrediction>,
}

impl Classification {
    /// Most confident category label
    pub fn top_category(&self) -> Option<&str> {
        self.category.first().map(|p| p.label.as_str())
    }

    pub fn material_labels(&self) -> impl Iterator<Item = &str> {
        self.material.iter().map(|p| p.label.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AttributeClassifier {
    provider: Arc<EmbeddingProvider>,
}

impl AttributeClassifier {
    pub fn new(provider: Arc<EmbeddingProvider>) -> Self {
        Self { provider }
    }

    pub async fn classify(&self, image: &GarmentImage) -> Result<Classification> {
        let started = Instant::now();

        let (category, color, material, condition, style) = tokio::try_join!(
            self.classify_bank(image, &prompts::CATEGORY),
            self.classify_bank(image, &prompts::COLOR),
            self.classify_bank(image, &prompts::MATERIAL),
            self.classify_bank(image, &prompts::CONDITION),
            self.classify_bank(image, &prompts::STYLE),
        )?;

        debug!("Classified garment in {:?}", started.elapsed());
        Ok(Classification {
            category,
            color,
            material,
            condition,
            style,
        })
    }

    /// Top-n cleaned labels of one bank
    pub async fn classify_bank(&self, image: &GarmentImage, bank: &PromptBank) -> Result<Vec<AttributePrediction>> {
        let scores = self.provider.score(image, bank.prompts).await?;
        Ok(ranked(scores)
            .into_iter()
            .take(bank.top_n)
            .map(|s| AttributePrediction::new(clean_label(&s.prompt), round3(s.score)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use modaics_core::{Embedding, Error};
    use modaics_encoder::{Encoder, HashingEncoder, ProviderConfig};

    fn provider(encoder: Arc<dyn Encoder>, dimension: usize) -> Arc<EmbeddingProvider> {
        Arc::new(EmbeddingProvider::with_encoder(
            encoder,
            ProviderConfig {
                dimension,
                max_concurrent_inference: 4,
                inference_timeout_ms: Some(10_000),
            },
        ))
    }

    /// Images sit on axis 0; only the dress and black prompts point there
    struct DressEncoder;

    impl Encoder for DressEncoder {
        fn dimension(&self) -> usize {
            3
        }

        fn encode_image(&self, _image: &GarmentImage) -> Result<Embedding> {
            Embedding::new(vec![1.0, 0.0, 0.0])
        }

        fn encode_text(&self, text: &str) -> Result<Embedding> {
            if text == "a photo of a dress" || text == "black colored clothing" {
                Embedding::new(vec![1.0, 0.0, 0.0])
            } else {
                Embedding::new(vec![0.0, 1.0, 0.0])
            }
        }
    }

    struct BrokenEncoder;

    impl Encoder for BrokenEncoder {
        fn dimension(&self) -> usize {
            3
        }

        fn encode_image(&self, _image: &GarmentImage) -> Result<Embedding> {
            Err(Error::ModelUnavailable("device lost".to_string()))
        }

        fn encode_text(&self, _text: &str) -> Result<Embedding> {
            Embedding::new(vec![0.0, 1.0, 0.0])
        }
    }

    fn image() -> GarmentImage {
        GarmentImage::from_rgb(RgbImage::from_pixel(16, 16, Rgb([20, 20, 20])))
    }

    #[tokio::test]
    async fn test_classify_reports_bank_sizes_and_labels() {
        let classifier = AttributeClassifier::new(provider(Arc::new(DressEncoder), 3));
        let result = classifier.classify(&image()).await.unwrap();

        assert_eq!(result.category.len(), 3);
        assert_eq!(result.color.len(), 3);
        assert_eq!(result.material.len(), 2);
        assert_eq!(result.condition.len(), 1);
        assert_eq!(result.style.len(), 2);

        assert_eq!(result.top_category(), Some("dress"));
        assert_eq!(result.category[0].confidence, 1.0);
        assert_eq!(result.color[0].label, "black");
        assert!(result
            .category
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
    }

    #[tokio::test]
    async fn test_classify_fails_whole_on_model_error() {
        let classifier = AttributeClassifier::new(provider(Arc::new(BrokenEncoder), 3));
        let err = classifier.classify(&image()).await.unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
    }

    #[tokio::test]
    async fn test_hashing_backend_produces_clean_labels() {
        let classifier = AttributeClassifier::new(provider(Arc::new(HashingEncoder::new(512).unwrap()), 512));
        let result = classifier.classify(&image()).await.unwrap();
        for prediction in result.category.iter().chain(&result.color).chain(&result.material) {
            assert!(!prediction.label.starts_with("a photo of"));
            assert!(!prediction.label.contains("clothing"));
            assert!((0.0..=1.0).contains(&prediction.confidence));
        }
    }
}
