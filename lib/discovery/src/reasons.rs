//! Keyword fallback scoring and match explanations

use ahash::AHashSet;
use modaics_core::Garment;

pub const MAX_REASONS: usize = 3;

const CATEGORY_WEIGHT: f32 = 0.3;
const BRAND_WEIGHT: f32 = 0.2;
const STORY_WORD_WEIGHT: f32 = 0.1;
const STORY_WEIGHT_CAP: f32 = 0.4;
const COLOR_WEIGHT: f32 = 0.1;

/// Keyword similarity for garments without an embedding, in [0, 1]
pub fn text_similarity(query: &str, garment: &Garment) -> f32 {
    let query = query.to_lowercase();
    let mut score = 0.0f32;

    if mentions(&query, &garment.category) {
        score += CATEGORY_WEIGHT;
    }
    if garment.brand.as_deref().is_some_and(|brand| mentions(&query, brand)) {
        score += BRAND_WEIGHT;
    }

    let story = garment.story_text().to_lowercase();
    if !story.is_empty() {
        let query_words: AHashSet<&str> = query.split_whitespace().collect();
        let story_words: AHashSet<&str> = story.split_whitespace().collect();
        let overlap = query_words.intersection(&story_words).count();
        score += (overlap as f32 * STORY_WORD_WEIGHT).min(STORY_WEIGHT_CAP);
    }

    if let Some(style) = garment.style() {
        if style.colors.iter().any(|color| mentions(&query, color)) {
            score += COLOR_WEIGHT;
        }
    }

    score.min(1.0)
}

/// Why a garment matched a free-text query
pub fn query_reasons(query: &str, garment: &Garment) -> Vec<String> {
    let query = query.to_lowercase();
    let mut reasons = Vec::new();

    if mentions(&query, &garment.category) {
        reasons.push(format!("Matches category: {}", garment.category));
    }
    if let Some(style) = garment.style() {
        if let Some(tag) = style.style_tags.iter().find(|tag| mentions(&query, tag)) {
            reasons.push(format!("{} style", tag));
        }
        if let Some(color) = style.colors.iter().find(|color| mentions(&query, color)) {
            reasons.push(format!("{} colorway", color));
        }
    }
    if let Some(source) = garment.provenance_source() {
        let source = source.to_lowercase();
        if query.contains(&source) {
            reasons.push(format!("{} item", source));
        }
    }

    if reasons.is_empty() {
        reasons.push("Style compatibility".to_string());
    }
    reasons.truncate(MAX_REASONS);
    reasons
}

/// Attribute overlap between a source garment and a similar match
pub fn similar_reasons(source: &Garment, candidate: &Garment) -> Vec<String> {
    let mut reasons = Vec::new();

    if let (Some(source_style), Some(match_style)) = (source.style(), candidate.style()) {
        let colors = shared(&source_style.colors, &match_style.colors);
        if !colors.is_empty() {
            reasons.push(format!("Shared colors: {}", colors.join(", ")));
        }
        let tags = shared(&source_style.style_tags, &match_style.style_tags);
        if !tags.is_empty() {
            reasons.push(format!("Similar style: {}", tags.join(", ")));
        }
    }

    if !candidate.category.is_empty() && source.category.eq_ignore_ascii_case(&candidate.category) {
        reasons.push(format!("Same category: {}", candidate.category));
    }

    if !source.condition.is_empty()
        && !candidate.condition.is_empty()
        && condition_rank(&candidate.condition) >= condition_rank(&source.condition)
    {
        reasons.push(format!("Great condition: {}", candidate.condition));
    }

    if reasons.is_empty() {
        reasons.push("Style compatibility match".to_string());
    }
    reasons.truncate(MAX_REASONS);
    reasons
}

/// Higher is better; unknown conditions rank lowest
fn condition_rank(condition: &str) -> u8 {
    match condition.to_lowercase().as_str() {
        "new" => 4,
        "excellent" => 3,
        "good" => 2,
        "fair" => 1,
        _ => 0,
    }
}

/// Whether the lowercased query contains `term`, ignoring empty terms
fn mentions(query: &str, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    !term.is_empty() && query.contains(&term)
}

/// Items of `source` that also appear in `other`, in source order, case-insensitive
fn shared<'a>(source: &'a [String], other: &[String]) -> Vec<&'a str> {
    let other: AHashSet<String> = other.iter().map(|s| s.to_lowercase()).collect();
    let mut seen: AHashSet<String> = AHashSet::new();
    source
        .iter()
        .filter(|s| {
            let key = s.to_lowercase();
            other.contains(&key) && seen.insert(key)
        })
        .map(String::as_str)
        .collect()
}
