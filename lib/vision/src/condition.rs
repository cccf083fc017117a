//! Condition grading and defect detection

use crate::prompts::{self, PromptBank};
use crate::routing::{self, Routing, RoutingAction};
use modaics_core::{round3, GarmentImage, Result};
use modaics_encoder::zero_shot::ranked;
use modaics_encoder::{EmbeddingProvider, PromptScore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Reported defects must exceed this confidence
pub const DEFECT_THRESHOLD: f32 = 0.15;

/// Condition grade, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub const ALL: [Grade; 5] = [Grade::A, Grade::B, Grade::C, Grade::D, Grade::F];

    pub fn info(self) -> &'static GradeInfo {
        &GRADE_TABLE[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed per-grade metadata
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeInfo {
    pub grade: Grade,
    pub label: &'static str,
    pub description: &'static str,
    pub sell_multiplier: f32,
    pub recommendation: RoutingAction,
}

/// Indexed by `Grade as usize`
pub const GRADE_TABLE: [GradeInfo; 5] = [
    GradeInfo {
        grade: Grade::A,
        label: "Like New",
        description: "No visible wear, pristine condition",
        sell_multiplier: 1.0,
        recommendation: RoutingAction::Sell,
    },
    GradeInfo {
        grade: Grade::B,
        label: "Excellent",
        description: "Minor signs of wear, barely noticeable",
        sell_multiplier: 0.75,
        recommendation: RoutingAction::Sell,
    },
    GradeInfo {
        grade: Grade::C,
        label: "Good",
        description: "Gentle wear visible but overall good condition",
        sell_multiplier: 0.5,
        recommendation: RoutingAction::Sell,
    },
    GradeInfo {
        grade: Grade::D,
        label: "Fair",
        description: "Visible wear and signs of use",
        sell_multiplier: 0.25,
        recommendation: RoutingAction::Donate,
    },
    GradeInfo {
        grade: Grade::F,
        label: "Worn/Damaged",
        description: "Significant wear, stains, or damage",
        sell_multiplier: 0.0,
        recommendation: RoutingAction::Recycle,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defect {
    /// e.g. "stains", "holes or tears"
    #[serde(rename = "type")]
    pub kind: String,
    pub confidence: f32,
}

/// Grade and defects read from the photo, before routing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeAssessment {
    pub grade: Grade,
    pub confidence: f32,
    /// Normalized per-grade scores, summing to ~1
    pub all_scores: BTreeMap<Grade, f32>,
    pub defects: Vec<Defect>,
}

/// Full grading outcome including routing advice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionGrade {
    pub grade: Grade,
    pub label: String,
    pub confidence: f32,
    pub description: String,
    pub sell_multiplier: f32,
    pub base_recommendation: RoutingAction,
    pub defects: Vec<Defect>,
    pub all_scores: BTreeMap<Grade, f32>,
    pub routing: Routing,
}

impl ConditionGrade {
    /// Attach table metadata and routing to an assessment
    pub fn from_assessment(
        assessment: GradeAssessment,
        brand_tier: Option<u8>,
        estimated_price: Option<f64>,
    ) -> Self {
        let info = assessment.grade.info();
        let routing = routing::route(assessment.grade, brand_tier, estimated_price);
        Self {
            grade: assessment.grade,
            label: info.label.to_string(),
            confidence: assessment.confidence,
            description: info.description.to_string(),
            sell_multiplier: info.sell_multiplier,
            base_recommendation: info.recommendation,
            defects: assessment.defects,
            all_scores: assessment.all_scores,
            routing,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConditionGrader {
    provider: Arc<EmbeddingProvider>,
}

impl ConditionGrader {
    pub fn new(provider: Arc<EmbeddingProvider>) -> Self {
        Self { provider }
    }

    /// Grade the photo and route it
    pub async fn grade(
        &self,
        image: &GarmentImage,
        brand_tier: Option<u8>,
        estimated_price: Option<f64>,
    ) -> Result<ConditionGrade> {
        let assessment = self.assess(image).await?;
        Ok(ConditionGrade::from_assessment(assessment, brand_tier, estimated_price))
    }

    /// Grade and defects without routing
    pub async fn assess(&self, image: &GarmentImage) -> Result<GradeAssessment> {
        let (grade_scores, defect_scores) = tokio::try_join!(
            self.provider.score(image, prompts::CONDITION.prompts),
            self.provider.score(image, prompts::DEFECT.prompts),
        )?;

        let raw: Vec<f32> = grade_scores.iter().map(|s| s.score).collect();
        let (grade, confidence, all_scores) = pick_grade(&raw);
        let defects = detect_defects(&prompts::DEFECT, defect_scores);

        debug!(
            "Graded {} ({:.3}) with {} defects",
            grade,
            confidence,
            defects.len()
        );
        Ok(GradeAssessment {
            grade,
            confidence,
            all_scores,
            defects,
        })
    }
}

/// Normalize per-grade scores and pick the best; earlier grades win ties
fn pick_grade(raw: &[f32]) -> (Grade, f32, BTreeMap<Grade, f32>) {
    let total: f32 = raw.iter().sum();
    let normalized: Vec<f32> = (0..Grade::ALL.len())
        .map(|i| {
            let score = raw.get(i).copied().unwrap_or(0.0);
            if total > 0.0 {
                round3(score / total)
            } else {
                0.0
            }
        })
        .collect();

    let mut best = 0;
    for (i, score) in normalized.iter().enumerate() {
        if *score > normalized[best] {
            best = i;
        }
    }

    let all_scores = Grade::ALL.iter().copied().zip(normalized.iter().copied()).collect();
    (Grade::ALL[best], normalized[best], all_scores)
}

fn detect_defects(bank: &PromptBank, scores: Vec<PromptScore>) -> Vec<Defect> {
    ranked(scores)
        .into_iter()
        .take(bank.top_n)
        .filter(|s| !s.prompt.contains("perfect"))
        .map(|s| (s.prompt, round3(s.score)))
        .filter(|(_, confidence)| *confidence > DEFECT_THRESHOLD)
        .map(|(prompt, confidence)| Defect {
            kind: prompt.replace("clothing with ", "").replace("visible ", ""),
            confidence,
        })
        .collect()
}
