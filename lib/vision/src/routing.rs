//! Sell / donate / recycle routing
//!
//! An ordered list of rules; the first whose predicate holds decides. Routing
//! is a pure function of the grade, the brand tier and the estimated price.

use crate::condition::Grade;
use serde::{Deserialize, Serialize};

/// Below this estimated price, selling is offered alongside donating
pub const LOW_VALUE_THRESHOLD: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingAction {
    Sell,
    Donate,
    Recycle,
    /// Let the owner pick between listing and donating
    Choice,
    SellDiscount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingConfidence {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routing {
    pub action: RoutingAction,
    pub reason: String,
    /// Owner-facing nudge, absent when the action needs no explanation
    pub message: Option<String>,
    pub confidence: RoutingConfidence,
}

/// Facts the rules look at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingInput {
    pub grade: Grade,
    /// 1 (ultra fast fashion) to 5 (luxury), `None` when the brand is unknown
    pub brand_tier: Option<u8>,
    pub estimated_price: Option<f64>,
}

pub struct RoutingRule {
    pub reason: &'static str,
    pub action: RoutingAction,
    pub confidence: RoutingConfidence,
    pub applies: fn(&RoutingInput) -> bool,
    pub message: fn(&RoutingInput) -> Option<String>,
}

/// Evaluated top to bottom; the last rule always applies
pub const ROUTING_RULES: [RoutingRule; 7] = [
    RoutingRule {
        reason: "premium_brand",
        action: RoutingAction::Sell,
        confidence: RoutingConfidence::High,
        applies: is_luxury,
        message: no_message,
    },
    RoutingRule {
        reason: "ultra_fast_fashion",
        action: RoutingAction::Donate,
        confidence: RoutingConfidence::High,
        applies: is_ultra_fast_fashion,
        message: ultra_fast_fashion_message,
    },
    RoutingRule {
        reason: "damaged",
        action: RoutingAction::Recycle,
        confidence: RoutingConfidence::High,
        applies: is_damaged,
        message: damaged_message,
    },
    RoutingRule {
        reason: "worn_fast_fashion",
        action: RoutingAction::Donate,
        confidence: RoutingConfidence::Medium,
        applies: is_worn_fast_fashion,
        message: worn_fast_fashion_message,
    },
    RoutingRule {
        reason: "low_value",
        action: RoutingAction::Choice,
        confidence: RoutingConfidence::Medium,
        applies: is_low_value,
        message: low_value_message,
    },
    RoutingRule {
        reason: "good_condition",
        action: RoutingAction::Sell,
        confidence: RoutingConfidence::High,
        applies: is_good_condition,
        message: no_message,
    },
    RoutingRule {
        reason: "moderate_condition",
        action: RoutingAction::SellDiscount,
        confidence: RoutingConfidence::Medium,
        applies: always,
        message: moderate_condition_message,
    },
];

/// Route a graded garment
pub fn route(grade: Grade, brand_tier: Option<u8>, estimated_price: Option<f64>) -> Routing {
    let input = RoutingInput {
        grade,
        brand_tier,
        estimated_price,
    };
    let rule = ROUTING_RULES
        .iter()
        .find(|rule| (rule.applies)(&input))
        .unwrap_or(&ROUTING_RULES[ROUTING_RULES.len() - 1]);

    Routing {
        action: rule.action,
        reason: rule.reason.to_string(),
        message: (rule.message)(&input),
        confidence: rule.confidence,
    }
}

fn is_luxury(input: &RoutingInput) -> bool {
    input.brand_tier == Some(5)
}

fn is_ultra_fast_fashion(input: &RoutingInput) -> bool {
    input.brand_tier == Some(1)
}

fn is_damaged(input: &RoutingInput) -> bool {
    input.grade == Grade::F
}

fn is_worn_fast_fashion(input: &RoutingInput) -> bool {
    input.grade == Grade::D && matches!(input.brand_tier, Some(tier) if tier <= 2)
}

/// A zero price means no estimate
fn is_low_value(input: &RoutingInput) -> bool {
    matches!(input.estimated_price, Some(price) if price > 0.0 && price < LOW_VALUE_THRESHOLD)
}

fn is_good_condition(input: &RoutingInput) -> bool {
    matches!(input.grade, Grade::A | Grade::B)
}

fn always(_: &RoutingInput) -> bool {
    true
}

fn no_message(_: &RoutingInput) -> Option<String> {
    None
}

fn ultra_fast_fashion_message(_: &RoutingInput) -> Option<String> {
    Some("Items from this brand typically sell for less than shipping costs. Want to give it a second life through donation instead?".to_string())
}

fn damaged_message(_: &RoutingInput) -> Option<String> {
    Some("This piece might be past its wearing days, but we can help you find textile recycling nearby.".to_string())
}

fn worn_fast_fashion_message(_: &RoutingInput) -> Option<String> {
    Some("This piece could make someone's day! Based on similar items, donating would create more impact than selling.".to_string())
}

fn low_value_message(input: &RoutingInput) -> Option<String> {
    let price = input.estimated_price.unwrap_or_default();
    Some(format!(
        "Similar items typically sell for ${:.0} AUD. You could list it or donate; either way it stays out of landfill!",
        price
    ))
}

fn moderate_condition_message(_: &RoutingInput) -> Option<String> {
    Some("This piece shows some wear, so consider pricing it competitively for a quick sale.".to_string())
}
