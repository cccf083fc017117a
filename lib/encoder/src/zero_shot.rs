//! Zero-shot prompt scoring
//!
//! CLIP-style classification: cosine similarity between the image and each
//! prompt, scaled by the model temperature, softmaxed over the prompt set.

use modaics_core::Embedding;
use serde::{Deserialize, Serialize};

/// CLIP's learned temperature, exp(4.6052)
pub const DEFAULT_LOGIT_SCALE: f32 = 100.0;

/// Raw score of one prompt; scores of a single call sum to 1
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptScore {
    pub prompt: String,
    pub score: f32,
}

/// Softmax over `logit_scale * cos(image, prompt)`, in prompt order
pub fn softmax_scores(
    image: &Embedding,
    prompts: &[&str],
    prompt_embeddings: &[Embedding],
    logit_scale: f32,
) -> Vec<PromptScore> {
    debug_assert_eq!(prompts.len(), prompt_embeddings.len());

    let logits: Vec<f32> = prompt_embeddings
        .iter()
        .map(|p| logit_scale * image.dot(p))
        .collect();

    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f32 = exps.iter().sum();

    prompts
        .iter()
        .zip(exps)
        .map(|(prompt, e)| PromptScore {
            prompt: (*prompt).to_string(),
            score: if total > 0.0 { e / total } else { 0.0 },
        })
        .collect()
}

/// Scores sorted by descending score; equal scores keep prompt order
pub fn ranked(mut scores: Vec<PromptScore>) -> Vec<PromptScore> {
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}
