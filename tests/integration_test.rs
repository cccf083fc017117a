// Integration tests for the Modaics pipeline
use image::{ImageFormat, Rgb, RgbImage};
use modaics::prelude::*;
use modaics::{AnalysisConfig, ColorExtractorConfig, ProviderConfig, StyleAttributes};
use modaics_vision::route;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use std::io::{Cursor, Write};
use std::sync::Arc;

fn provider() -> Arc<EmbeddingProvider> {
    let config = ProviderConfig {
        max_concurrent_inference: 4,
        ..Default::default()
    };
    Arc::new(EmbeddingProvider::new(
        Arc::new(HashingLoader {
            dimension: config.dimension,
        }),
        config,
    ))
}

fn analyzer() -> GarmentAnalyzer {
    GarmentAnalyzer::new(provider(), ColorExtractorConfig::default(), AnalysisConfig::default())
}

/// Red left half, navy right half
fn two_tone_png() -> Vec<u8> {
    let img = RgbImage::from_fn(64, 64, |x, _| {
        if x < 32 {
            Rgb([200, 30, 40])
        } else {
            Rgb([30, 40, 130])
        }
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
    bytes
}

#[tokio::test]
async fn test_single_image_analysis() {
    let analyzer = analyzer();
    let analysis = analyzer
        .analyze_bytes(&two_tone_png(), &AnalysisHints::default())
        .await
        .unwrap();

    let classification = &analysis.classification;
    assert_eq!(classification.category.len(), 3);
    assert_eq!(classification.material.len(), 2);
    assert_eq!(classification.condition.len(), 1);
    assert!(classification
        .category
        .windows(2)
        .all(|w| w[0].confidence >= w[1].confidence));

    let colors = &analysis.detected_colors.colors;
    assert!(!colors.is_empty());
    let total: f32 = colors.iter().map(|c| c.percentage).sum();
    assert!(total <= 1.0 + 1e-6);
    assert_eq!(colors.iter().filter(|c| c.is_dominant).count(), 1);
    assert_eq!(analysis.detected_colors.dominant, colors[0]);

    assert_eq!(analysis.embedding.dim(), 512);
    let norm: f32 = analysis.embedding.as_slice().iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-4);

    let price = &analysis.estimated_price;
    assert!(price.recommended >= dec!(5.00));
    assert!(price.min <= price.recommended && price.recommended <= price.max);
    assert_eq!(price.currency, "AUD");

    let grade = &analysis.condition_grade;
    assert_eq!(grade.routing, route(grade.grade, None, price.recommended.to_f64()));
    assert!((50..=100).contains(&analysis.sustainability_score));
}

#[tokio::test]
async fn test_embeddings_are_idempotent() {
    let analyzer = analyzer();
    let image = GarmentImage::decode(&two_tone_png(), 10 * 1024 * 1024).unwrap();

    let first = analyzer.provider().encode_image(&image).await.unwrap();
    let second = analyzer.provider().encode_image(&image).await.unwrap();
    assert_eq!(first, second);
    assert!((EmbeddingProvider::similarity(&first, &second) - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn test_invalid_upload_is_rejected() {
    let err = analyzer()
        .analyze_bytes(b"not an image", &AnalysisHints::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_batch_analysis() {
    let analyzer = analyzer();
    let uploads = vec![two_tone_png(), two_tone_png()];
    let batch = analyzer.analyze_batch(&uploads).await.unwrap();

    assert_eq!(batch.image_count, 2);
    assert_eq!(batch.individual_results.len(), 2);
    assert!(!batch.aggregated.category.is_empty());
    assert!(batch.aggregated.category.len() <= 3);
    let voted = &batch.aggregated.category[0].label;
    assert!(batch.individual_results[0].category.iter().any(|p| &p.label == voted));
}

#[tokio::test]
async fn test_batch_limit_checked_before_decoding() {
    let analyzer = analyzer();
    let uploads: Vec<Vec<u8>> = (0..9).map(|_| b"garbage".to_vec()).collect();
    let err = analyzer.analyze_batch(&uploads).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(ref msg) if msg.contains("at most 8")));

    let empty: Vec<Vec<u8>> = Vec::new();
    assert!(analyzer.analyze_batch(&empty).await.is_err());
}

#[test]
fn test_reference_price() {
    let estimate = PricingEngine::default().estimate(&PriceRequest::new("dress", "new"));
    assert_eq!(estimate.recommended, dec!(102.00));
    assert_eq!(estimate.min, dec!(81.60));
    assert_eq!(estimate.max, dec!(122.40));

    let floor = PricingEngine::default().estimate(
        &PriceRequest::new("accessory", "fair")
            .with_brand("h&m")
            .with_original_price(dec!(5.00)),
    );
    assert_eq!(floor.recommended, dec!(5.00));
}

#[tokio::test]
async fn test_discovery_over_embedded_listings() {
    let provider = provider();
    let descriptions = [
        ("slip", "dress", "black silk slip dress"),
        ("coat", "coat", "chunky wool winter coat"),
        ("tee", "t-shirt", "plain organic cotton tee"),
    ];

    let created = chrono::Utc::now();
    let mut listings = Vec::new();
    for (i, (id, category, text)) in descriptions.iter().enumerate() {
        let embedding = provider.embed_garment(Some(*text), None, None).await.unwrap();
        let listed = created - chrono::Duration::days(i as i64);
        listings.push(Garment::new((*id).into(), *category, "good", listed).with_embedding(embedding));
    }

    let ranker = DiscoveryRanker::new(provider.clone(), Default::default());
    let page = ranker
        .discover(
            &DiscoveryQuery::text("black silk slip dress"),
            &listings,
            ranker.first_page(),
        )
        .await
        .unwrap();

    assert_eq!(page.results[0].garment_ref.to_string(), "slip");
    assert_eq!(page.results[0].similarity, 1.0);
    assert!(page.results.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    assert!(page.results.iter().all(|r| r.similarity >= 0.1 && r.reasons.len() <= 3));
    assert_eq!(page.stats.best_similarity, 1.0);

    let similar = ranker.similar(&listings[0], &listings, true, ranker.first_page()).unwrap();
    assert!(similar.results.iter().all(|r| r.garment_ref.to_string() != "slip"));
    assert!(similar.results.iter().all(|r| r.similarity >= 0.3));
}

#[tokio::test]
async fn test_discovery_with_no_candidates() {
    let ranker = DiscoveryRanker::new(provider(), Default::default());
    let page = ranker
        .discover(&DiscoveryQuery::text("anything"), &[], PageRequest::new(1, 20))
        .await
        .unwrap();
    assert!(page.results.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!(page.pages, 0);
}

#[tokio::test]
async fn test_style_only_embedding_matches_style_query() {
    let provider = provider();
    let style = StyleAttributes {
        colors: vec!["navy".to_string()],
        style_tags: vec!["workwear".to_string()],
        ..Default::default()
    };
    let embedding = provider.embed_garment(None, None, Some(&style)).await.unwrap();
    let expected = provider
        .encode_text("A garment with colors: navy, style: workwear")
        .await
        .unwrap();
    assert!((EmbeddingProvider::similarity(&embedding, &expected) - 1.0).abs() < 1e-5);
}

#[test]
fn test_config_file_drives_components() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"discovery": {{"default_page_size": 5}}, "analysis": {{"max_batch_images": 2}}}}"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    let ranker = DiscoveryRanker::new(provider(), config.discovery.clone());
    assert_eq!(ranker.first_page(), PageRequest::new(1, 5));

    let analyzer = GarmentAnalyzer::new(provider(), config.colors.clone(), config.analysis.clone());
    assert_eq!(analyzer.config().max_batch_images, 2);
}
