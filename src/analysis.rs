//! Garment analysis
//!
//! Composes the per-photo components into one record: classification,
//! colour palette, condition grade and embedding run concurrently, then the
//! price estimate, routing, sustainability score and listing suggestions are
//! derived from their outputs.

use crate::config::AnalysisConfig;
use modaics_core::{Embedding, Error, GarmentImage, Provenance, Result};
use modaics_encoder::EmbeddingProvider;
use modaics_pricing::{brand_tier, canonical_category, BrandTier, Condition, PriceEstimate, PriceRequest, PricingEngine};
use modaics_vision::{
    aggregate, AggregatedPredictions, AttributeClassifier, Classification, ColorAnalysis, ColorExtractor,
    ColorExtractorConfig, ConditionGrade, ConditionGrader, Grade,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

const BASE_SUSTAINABILITY: u32 = 50;
const MATERIAL_POINTS: u32 = 10;
const MATERIAL_SCORE_CAP: u32 = 80;
const MAX_SUSTAINABILITY: u32 = 100;

const LOW_IMPACT_MATERIALS: [&str; 9] = [
    "organic cotton",
    "hemp",
    "linen",
    "tencel",
    "recycled polyester",
    "bamboo",
    "wool",
    "silk",
    "cashmere",
];

const VERSATILE_CATEGORIES: [&str; 3] = ["dress", "jacket", "coat"];

/// Seller-supplied facts the photo cannot show
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisHints {
    pub brand: Option<String>,
    pub provenance: Option<Provenance>,
    pub original_price: Option<Decimal>,
}

impl AnalysisHints {
    #[inline]
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    fn brand_tier(&self) -> Option<BrandTier> {
        self.brand.as_deref().and_then(brand_tier)
    }
}

/// Everything derived from one garment photo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GarmentAnalysis {
    #[serde(flatten)]
    pub classification: Classification,
    pub detected_colors: ColorAnalysis,
    pub condition_grade: ConditionGrade,
    pub embedding: Embedding,
    pub estimated_price: PriceEstimate,
    /// 0 to 100
    pub sustainability_score: u32,
    pub suggestions: Vec<String>,
}

/// Classification consensus over several photos of the same garment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchAnalysis {
    pub individual_results: Vec<Classification>,
    pub aggregated: AggregatedPredictions,
    pub image_count: usize,
}

pub struct GarmentAnalyzer {
    provider: Arc<EmbeddingProvider>,
    classifier: AttributeClassifier,
    colors: ColorExtractor,
    grader: ConditionGrader,
    pricing: PricingEngine,
    config: AnalysisConfig,
}

impl GarmentAnalyzer {
    pub fn new(provider: Arc<EmbeddingProvider>, colors: ColorExtractorConfig, config: AnalysisConfig) -> Self {
        Self {
            classifier: AttributeClassifier::new(provider.clone()),
            grader: ConditionGrader::new(provider.clone()),
            colors: ColorExtractor::new(colors),
            pricing: PricingEngine::default(),
            provider,
            config,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_pricing(mut self, pricing: PricingEngine) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn provider(&self) -> &Arc<EmbeddingProvider> {
        &self.provider
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Decode an upload and analyze it
    pub async fn analyze_bytes(&self, bytes: &[u8], hints: &AnalysisHints) -> Result<GarmentAnalysis> {
        let image = GarmentImage::decode(bytes, self.config.max_upload_bytes)?;
        self.analyze(&image, hints).await
    }

    pub async fn analyze(&self, image: &GarmentImage, hints: &AnalysisHints) -> Result<GarmentAnalysis> {
        let started = Instant::now();

        let (classification, detected_colors, assessment, embedding) = tokio::try_join!(
            self.classifier.classify(image),
            self.extract_colors(image),
            self.grader.assess(image),
            self.provider.encode_image(image),
        )?;

        let category = canonical_category(classification.top_category().unwrap_or("unknown"));
        let condition = Condition::from_grade(assessment.grade.as_str());

        let mut request = PriceRequest::new(&category, condition.as_str());
        request.brand = hints.brand.as_deref();
        request.provenance = hints.provenance.as_ref();
        request.original_price = hints.original_price;
        let estimated_price = self.pricing.estimate(&request);

        let condition_grade = ConditionGrade::from_assessment(
            assessment,
            hints.brand_tier().map(BrandTier::level),
            estimated_price.recommended.to_f64(),
        );

        let sustainability_score = sustainability_score(&classification, condition_grade.grade);
        let suggestions = suggestions(&classification, condition_grade.grade);

        info!(
            "Analyzed {} photo: grade {}, {} {}, routed to {:?} in {:?}",
            category,
            condition_grade.grade,
            estimated_price.recommended,
            estimated_price.currency,
            condition_grade.routing.action,
            started.elapsed()
        );

        Ok(GarmentAnalysis {
            classification,
            detected_colors,
            condition_grade,
            embedding,
            estimated_price,
            sustainability_score,
            suggestions,
        })
    }

    /// Classify several photos of one garment and vote on its category
    ///
    /// The image count is checked before anything is decoded.
    pub async fn analyze_batch<B: AsRef<[u8]>>(&self, uploads: &[B]) -> Result<BatchAnalysis> {
        if uploads.is_empty() {
            return Err(Error::InvalidInput("at least one image is required".to_string()));
        }
        if uploads.len() > self.config.max_batch_images {
            return Err(Error::InvalidInput(format!(
                "at most {} images are allowed per analysis, got {}",
                self.config.max_batch_images,
                uploads.len()
            )));
        }

        let images = uploads
            .iter()
            .map(|bytes| GarmentImage::decode(bytes.as_ref(), self.config.max_upload_bytes))
            .collect::<Result<Vec<_>>>()?;

        let mut individual_results = Vec::with_capacity(images.len());
        for image in &images {
            individual_results.push(self.classifier.classify(image).await?);
        }

        let aggregated = aggregate(&individual_results);
        debug!(
            "Batch of {} photos agrees on {:?}",
            images.len(),
            aggregated.category.first().map(|p| p.label.as_str())
        );

        Ok(BatchAnalysis {
            image_count: individual_results.len(),
            individual_results,
            aggregated,
        })
    }

    /// Palette extraction is CPU-bound, so it runs on the blocking pool
    async fn extract_colors(&self, image: &GarmentImage) -> Result<ColorAnalysis> {
        let extractor = self.colors.clone();
        let image = image.clone();
        tokio::task::spawn_blocking(move || extractor.analyze(&image))
            .await
            .map_err(|e| Error::ModelUnavailable(format!("color extraction task failed: {}", e)))
    }
}

impl std::fmt::Debug for GarmentAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GarmentAnalyzer")
            .field("provider", &self.provider)
            .field("colors", self.colors.config())
            .field("config", &self.config)
            .finish()
    }
}

/// 50 base, 10 per low-impact material (materials capped at 80), plus a
/// condition bonus, clamped to 100
pub fn sustainability_score(classification: &Classification, grade: Grade) -> u32 {
    let material_hits = classification
        .material_labels()
        .filter(|label| is_low_impact(label))
        .count() as u32;
    let score = (BASE_SUSTAINABILITY + material_hits * MATERIAL_POINTS).min(MATERIAL_SCORE_CAP);
    (score + condition_points(grade)).min(MAX_SUSTAINABILITY)
}

fn condition_points(grade: Grade) -> u32 {
    match grade {
        Grade::A => 15,
        Grade::B => 10,
        Grade::C => 5,
        Grade::D => 3,
        Grade::F => 0,
    }
}

fn is_low_impact(label: &str) -> bool {
    let label = label.to_lowercase();
    LOW_IMPACT_MATERIALS.iter().any(|m| label.contains(m))
}

/// Listing tips for the seller
pub fn suggestions(classification: &Classification, grade: Grade) -> Vec<String> {
    let mut tips = Vec::new();

    if let Some(category) = classification
        .top_category()
        .filter(|c| VERSATILE_CATEGORIES.contains(c))
    {
        tips.push(format!(
            "Consider mentioning the {}'s versatility for different occasions",
            category
        ));
    }

    match grade {
        Grade::D | Grade::F => {
            tips.push("Be transparent about wear and include detailed photos of any imperfections".to_string())
        }
        Grade::A => tips.push("Highlight the excellent condition in your title for faster sales".to_string()),
        Grade::B | Grade::C => {}
    }

    let premium_fibre = classification.material_labels().any(|label| {
        let label = label.to_lowercase();
        label.contains("wool") || label.contains("cashmere")
    });
    if premium_fibre {
        tips.push(
            "Premium materials like wool or cashmere should be highlighted, with care instructions".to_string(),
        );
    }

    tips
}

#[cfg(test)]
mod tests {
    use super::*;
    use modaics_core::AttributePrediction;

    fn prediction(label: &str, confidence: f32) -> AttributePrediction {
        AttributePrediction::new(label, confidence)
    }

    fn classification(category: &str, materials: &[&str]) -> Classification {
        Classification {
            category: vec![prediction(category, 0.9)],
            material: materials.iter().map(|m| prediction(m, 0.4)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sustainability_score() {
        assert_eq!(sustainability_score(&classification("dress", &["polyester"]), Grade::C), 55);
        assert_eq!(
            sustainability_score(&classification("dress", &["organic cotton", "linen"]), Grade::A),
            85
        );
        assert_eq!(sustainability_score(&classification("coat", &["merino wool"]), Grade::F), 60);
        assert_eq!(sustainability_score(&Classification::default(), Grade::D), 53);
    }

    #[test]
    fn test_suggestions() {
        let tips = suggestions(&classification("coat", &["cashmere"]), Grade::A);
        assert_eq!(tips.len(), 3);
        assert!(tips[0].contains("coat's versatility"));
        assert!(tips[1].starts_with("Highlight"));
        assert!(tips[2].contains("wool or cashmere"));

        let tips = suggestions(&classification("jeans", &["denim"]), Grade::F);
        assert_eq!(tips, vec!["Be transparent about wear and include detailed photos of any imperfections"]);

        assert!(suggestions(&classification("shirt", &["cotton"]), Grade::B).is_empty());
    }
}
