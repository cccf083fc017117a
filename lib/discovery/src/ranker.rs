//! Discovery ranker
//!
//! Scores a candidate pool against a free-text query or a source garment,
//! drops weak matches, orders by similarity (newest first on ties) and cuts
//! the requested page. Garments without a usable embedding fall back to
//! keyword scoring for text queries.

use crate::config::DiscoveryConfig;
use crate::query::{DiscoveryPage, DiscoveryQuery, DiscoveryResult, DiscoveryStats, PageRequest};
use crate::reasons::{query_reasons, similar_reasons, text_similarity};
use modaics_core::{round3, Embedding, Error, Garment, Result};
use modaics_encoder::EmbeddingProvider;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Similarity given to every candidate when there is no query
pub const RECENCY_SIMILARITY: f32 = 0.5;

const RECENTLY_LISTED: &str = "Recently listed";

/// A candidate that survived scoring; `similarity` is unrounded
#[derive(Debug, Clone)]
struct Scored<'a> {
    garment: &'a Garment,
    similarity: f32,
    reasons: Vec<String>,
}

pub struct DiscoveryRanker {
    provider: Arc<EmbeddingProvider>,
    config: DiscoveryConfig,
}

impl DiscoveryRanker {
    pub fn new(provider: Arc<EmbeddingProvider>, config: DiscoveryConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// First page at the configured default size
    pub fn first_page(&self) -> PageRequest {
        PageRequest::new(1, self.config.default_page_size)
    }

    /// Rank `candidates` against a free-text query
    ///
    /// Candidates failing the query's filter are not considered. A blank
    /// query lists the pool newest first.
    pub async fn discover(
        &self,
        query: &DiscoveryQuery,
        candidates: &[Garment],
        page: PageRequest,
    ) -> Result<DiscoveryPage> {
        page.validate(self.config.max_page_size)?;
        let start = Instant::now();

        let pool: Vec<&Garment> = candidates.iter().filter(|g| query.filter.matches(g)).collect();

        let scored = match query.effective_text() {
            None => rank_recent(&pool),
            Some(text) => {
                let query_embedding = self.provider.encode_text(&text).await?;
                rank_by_query(&text, &query_embedding, &pool, self.config.min_similarity)
            }
        };

        let page = paginate(scored, pool.len(), page);
        debug!(
            "discovery ranked {} of {} candidates in {:?}",
            page.total,
            pool.len(),
            start.elapsed()
        );
        Ok(page)
    }

    /// Garments whose embeddings are close to `source`
    ///
    /// Candidates without an embedding, and the source itself, are skipped.
    /// With `exclude_same_owner`, listings by the source's owner are skipped
    /// too.
    pub fn similar(
        &self,
        source: &Garment,
        candidates: &[Garment],
        exclude_same_owner: bool,
        page: PageRequest,
    ) -> Result<DiscoveryPage> {
        page.validate(self.config.max_page_size)?;
        let source_embedding = source
            .embedding
            .as_ref()
            .ok_or_else(|| Error::NoEmbedding(source.id.to_string()))?;

        let pool: Vec<&Garment> = candidates
            .iter()
            .filter(|g| g.id != source.id)
            .filter(|g| !(exclude_same_owner && same_owner(source, g)))
            .collect();

        let scored = rank_similar(
            source,
            source_embedding,
            &pool,
            self.config.similar_min_similarity,
        );
        Ok(paginate(scored, pool.len(), page))
    }
}

impl std::fmt::Debug for DiscoveryRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryRanker")
            .field("config", &self.config)
            .finish()
    }
}

fn same_owner(a: &Garment, b: &Garment) -> bool {
    matches!((&a.owner_id, &b.owner_id), (Some(x), Some(y)) if x == y)
}

/// Stored embedding if it can be compared with `query`
fn usable_embedding<'a>(garment: &'a Garment, query: &Embedding) -> Option<&'a Embedding> {
    let embedding = garment.embedding.as_ref()?;
    if embedding.dim() != query.dim() {
        warn!(
            "garment {} has a {}-dim embedding, expected {}",
            garment.id,
            embedding.dim(),
            query.dim()
        );
        return None;
    }
    Some(embedding)
}

fn rank_recent<'a>(pool: &[&'a Garment]) -> Vec<Scored<'a>> {
    let mut scored: Vec<Scored<'a>> = pool
        .iter()
        .copied()
        .map(|garment| Scored {
            garment,
            similarity: RECENCY_SIMILARITY,
            reasons: vec![RECENTLY_LISTED.to_string()],
        })
        .collect();
    sort(&mut scored);
    scored
}

fn rank_by_query<'a>(
    query: &str,
    query_embedding: &Embedding,
    pool: &[&'a Garment],
    min_similarity: f32,
) -> Vec<Scored<'a>> {
    let mut scored: Vec<Scored<'a>> = pool
        .iter()
        .copied()
        .filter_map(|garment| {
            let similarity = match usable_embedding(garment, query_embedding) {
                Some(embedding) => EmbeddingProvider::similarity(query_embedding, embedding),
                None => text_similarity(query, garment),
            };
            (similarity >= min_similarity).then(|| Scored {
                garment,
                similarity,
                reasons: query_reasons(query, garment),
            })
        })
        .collect();
    sort(&mut scored);
    scored
}

fn rank_similar<'a>(
    source: &Garment,
    source_embedding: &Embedding,
    pool: &[&'a Garment],
    min_similarity: f32,
) -> Vec<Scored<'a>> {
    let mut scored: Vec<Scored<'a>> = pool
        .iter()
        .copied()
        .filter_map(|garment| {
            let embedding = usable_embedding(garment, source_embedding)?;
            let similarity = EmbeddingProvider::similarity(source_embedding, embedding);
            (similarity >= min_similarity).then(|| Scored {
                garment,
                similarity,
                reasons: similar_reasons(source, garment),
            })
        })
        .collect();
    sort(&mut scored);
    scored
}

/// Similarity descending, then newest first
fn sort(scored: &mut [Scored<'_>]) {
    scored.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| b.garment.created_at.cmp(&a.garment.created_at))
    });
}

fn stats(scored: &[Scored<'_>], candidates_count: usize) -> DiscoveryStats {
    if scored.is_empty() {
        return DiscoveryStats {
            candidates_count,
            ..Default::default()
        };
    }
    let sum: f32 = scored.iter().map(|s| s.similarity).sum();
    let best = scored.iter().map(|s| s.similarity).fold(0.0f32, f32::max);
    DiscoveryStats {
        candidates_count,
        results_count: scored.len(),
        avg_similarity: round3(sum / scored.len() as f32),
        best_similarity: round3(best),
    }
}

fn paginate(scored: Vec<Scored<'_>>, candidates_count: usize, page: PageRequest) -> DiscoveryPage {
    let stats = stats(&scored, candidates_count);
    let total = scored.len();
    let results = scored
        .into_iter()
        .skip((page.page - 1).saturating_mul(page.page_size))
        .take(page.page_size)
        .map(|s| DiscoveryResult {
            garment_ref: s.garment.id.clone(),
            similarity: round3(s.similarity),
            reasons: s.reasons,
        })
        .collect();

    DiscoveryPage {
        results,
        total,
        page: page.page,
        page_size: page.page_size,
        pages: page.page_count(total),
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use modaics_core::{GarmentImage, GarmentRef, StyleAttributes};
    use modaics_encoder::{Encoder, ProviderConfig};

    /// Dresses on axis 0, coats on axis 1, everything else on axis 2
    struct KeywordEncoder;

    impl Encoder for KeywordEncoder {
        fn dimension(&self) -> usize {
            3
        }

        fn encode_image(&self, _image: &GarmentImage) -> Result<Embedding> {
            Embedding::new(vec![0.0, 0.0, 1.0])
        }

        fn encode_text(&self, text: &str) -> Result<Embedding> {
            let text = text.to_lowercase();
            if text.contains("dress") {
                Embedding::new(vec![1.0, 0.0, 0.0])
            } else if text.contains("coat") {
                Embedding::new(vec![0.0, 1.0, 0.0])
            } else {
                Embedding::new(vec![0.0, 0.0, 1.0])
            }
        }
    }

    fn ranker() -> DiscoveryRanker {
        let provider = EmbeddingProvider::with_encoder(
            Arc::new(KeywordEncoder),
            ProviderConfig {
                dimension: 3,
                max_concurrent_inference: 2,
                inference_timeout_ms: Some(5_000),
            },
        );
        DiscoveryRanker::new(Arc::new(provider), DiscoveryConfig::default())
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, 9, 0, 0).unwrap()
    }

    fn listing(id: &str, category: &str, created: u32, vector: Option<Vec<f32>>) -> Garment {
        let garment = Garment::new(id.into(), category, "good", day(created));
        match vector {
            Some(v) => garment.with_embedding(Embedding::new(v).unwrap()),
            None => garment,
        }
    }

    fn ids(page: &DiscoveryPage) -> Vec<String> {
        page.results.iter().map(|r| r.garment_ref.to_string()).collect()
    }

    #[tokio::test]
    async fn test_discover_orders_by_similarity_then_recency() {
        let candidates = vec![
            listing("old-dress", "dress", 1, Some(vec![1.0, 0.0, 0.0])),
            listing("new-dress", "dress", 5, Some(vec![1.0, 0.0, 0.0])),
            listing("near-dress", "dress", 9, Some(vec![0.8, 0.6, 0.0])),
            listing("coat", "coat", 3, Some(vec![0.0, 1.0, 0.0])),
        ];
        let page = ranker()
            .discover(&DiscoveryQuery::text("black dress"), &candidates, PageRequest::new(1, 20))
            .await
            .unwrap();

        assert_eq!(ids(&page), vec!["new-dress", "old-dress", "near-dress"]);
        assert_eq!(page.results[0].similarity, 1.0);
        assert_eq!(page.results[2].similarity, 0.8);
        assert_eq!(page.results[0].reasons, vec!["Matches category: dress"]);
        assert_eq!(page.total, 3);
        assert_eq!(page.pages, 1);
        assert_eq!(page.stats.candidates_count, 4);
        assert_eq!(page.stats.results_count, 3);
        assert_eq!(page.stats.best_similarity, 1.0);
        assert!((page.stats.avg_similarity - 0.933).abs() < 1e-6);
    }

    fn at_angle(cos: f32) -> Vec<f32> {
        vec![cos, (1.0 - cos * cos).sqrt(), 0.0]
    }

    #[tokio::test]
    async fn test_discover_threshold_uses_unrounded_similarity() {
        let candidates = vec![
            listing("just-below", "dress", 1, Some(at_angle(0.0996))),
            listing("just-above", "dress", 2, Some(at_angle(0.1004))),
        ];
        let page = ranker()
            .discover(&DiscoveryQuery::text("dress"), &candidates, PageRequest::new(1, 20))
            .await
            .unwrap();

        assert_eq!(ids(&page), vec!["just-above"]);
        assert_eq!(page.total, 1);
        assert_eq!(page.results[0].similarity, 0.1);
    }

    #[tokio::test]
    async fn test_discover_sorts_near_ties_by_unrounded_similarity() {
        let candidates = vec![
            listing("older-closer", "dress", 1, Some(at_angle(0.8004))),
            listing("newer-further", "dress", 9, Some(at_angle(0.7996))),
        ];
        let page = ranker()
            .discover(&DiscoveryQuery::text("dress"), &candidates, PageRequest::new(1, 20))
            .await
            .unwrap();

        assert_eq!(ids(&page), vec!["older-closer", "newer-further"]);
        assert!(page.results.iter().all(|r| r.similarity == 0.8));
    }

    #[tokio::test]
    async fn test_discover_falls_back_to_keywords() {
        let candidates = vec![
            listing("keyword", "dress", 2, None).with_brand("Reformation"),
            listing("unrelated", "hat", 3, None),
        ];
        let page = ranker()
            .discover(
                &DiscoveryQuery::text("reformation dress"),
                &candidates,
                PageRequest::new(1, 20),
            )
            .await
            .unwrap();

        assert_eq!(ids(&page), vec!["keyword"]);
        assert_eq!(page.results[0].similarity, 0.5);
    }

    #[tokio::test]
    async fn test_discover_without_query_lists_newest_first() {
        let candidates = vec![
            listing("a", "dress", 1, None),
            listing("b", "coat", 7, None),
            listing("c", "skirt", 4, None),
        ];
        let page = ranker()
            .discover(&DiscoveryQuery::text("  "), &candidates, PageRequest::new(1, 20))
            .await
            .unwrap();

        assert_eq!(ids(&page), vec!["b", "c", "a"]);
        assert!(page.results.iter().all(|r| r.similarity == RECENCY_SIMILARITY));
        assert_eq!(page.results[0].reasons, vec!["Recently listed"]);
    }

    #[tokio::test]
    async fn test_discover_with_no_matches() {
        let candidates = vec![listing("coat", "coat", 1, Some(vec![0.0, 1.0, 0.0]))];
        let page = ranker()
            .discover(&DiscoveryQuery::text("dress"), &candidates, PageRequest::new(1, 20))
            .await
            .unwrap();

        assert!(page.results.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.pages, 0);
        assert_eq!(page.stats.best_similarity, 0.0);
    }

    #[tokio::test]
    async fn test_discover_paginates_after_sorting() {
        let candidates: Vec<Garment> = (1..=5)
            .map(|d| listing(&format!("g{}", d), "dress", d, None))
            .collect();
        let ranker = ranker();

        let second = ranker
            .discover(&DiscoveryQuery::default(), &candidates, PageRequest::new(2, 2))
            .await
            .unwrap();
        assert_eq!(ids(&second), vec!["g3", "g2"]);
        assert_eq!(second.total, 5);
        assert_eq!(second.pages, 3);

        let beyond = ranker
            .discover(&DiscoveryQuery::default(), &candidates, PageRequest::new(9, 2))
            .await
            .unwrap();
        assert!(beyond.results.is_empty());
        assert_eq!(beyond.total, 5);
    }

    #[tokio::test]
    async fn test_discover_applies_filter() {
        let candidates = vec![
            listing("dress", "dress", 1, None),
            listing("coat", "coat", 2, None),
        ];
        let query = DiscoveryQuery::default().with_filter(crate::query::CandidateFilter {
            category: Some("Coat".to_string()),
            ..Default::default()
        });
        let page = ranker()
            .discover(&query, &candidates, PageRequest::new(1, 20))
            .await
            .unwrap();
        assert_eq!(ids(&page), vec!["coat"]);
        assert_eq!(page.stats.candidates_count, 1);
    }

    #[tokio::test]
    async fn test_discover_rejects_bad_page() {
        let result = ranker()
            .discover(&DiscoveryQuery::default(), &[], PageRequest::new(1, 500))
            .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_similar_requires_source_embedding() {
        let source = listing("src", "dress", 1, None);
        let result = ranker().similar(&source, &[], true, PageRequest::new(1, 20));
        assert!(matches!(result, Err(Error::NoEmbedding(_))));
    }

    #[test]
    fn test_similar_skips_source_owner_and_missing_embeddings() {
        let style = StyleAttributes {
            colors: vec!["black".to_string()],
            ..Default::default()
        };
        let source = listing("src", "dress", 1, Some(vec![1.0, 0.0, 0.0]))
            .with_owner("alice")
            .with_style(style.clone());
        let candidates = vec![
            source.clone(),
            listing("mine", "dress", 2, Some(vec![1.0, 0.0, 0.0])).with_owner("alice"),
            listing("theirs", "dress", 3, Some(vec![0.6, 0.8, 0.0]))
                .with_owner("bob")
                .with_style(style),
            listing("bare", "dress", 4, None),
            listing("far", "coat", 5, Some(vec![0.2, 0.0, 0.98])),
        ];

        let ranker = ranker();
        let page = ranker
            .similar(&source, &candidates, true, PageRequest::new(1, 20))
            .unwrap();
        assert_eq!(ids(&page), vec!["theirs"]);
        assert_eq!(page.results[0].garment_ref, GarmentRef::from("theirs"));
        assert_eq!(
            page.results[0].reasons,
            vec!["Shared colors: black", "Same category: dress", "Great condition: good"]
        );

        let with_own = ranker
            .similar(&source, &candidates, false, PageRequest::new(1, 20))
            .unwrap();
        assert_eq!(ids(&with_own), vec!["mine", "theirs"]);
    }

    #[test]
    fn test_similar_threshold_uses_unrounded_similarity() {
        let source = listing("src", "dress", 1, Some(vec![1.0, 0.0, 0.0]));
        let candidates = vec![
            listing("just-below", "dress", 2, Some(at_angle(0.2996))),
            listing("just-above", "dress", 3, Some(at_angle(0.3004))),
        ];
        let page = ranker()
            .similar(&source, &candidates, false, PageRequest::new(1, 20))
            .unwrap();

        assert_eq!(ids(&page), vec!["just-above"]);
        assert_eq!(page.results[0].similarity, 0.3);
        assert_eq!(page.stats.best_similarity, 0.3);
    }
}
