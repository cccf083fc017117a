//! Price estimation
//!
//! `base * condition * brand * rarity + sustainability bonus`, rounded half
//! up to cents and floored at $5. All arithmetic is decimal.

use crate::tables::{
    brand_multiplier, category_base_price, CERTIFICATION_BONUSES, DEFAULT_BASE_PRICE, MATERIAL_BONUS,
    MAX_SUSTAINABILITY_BONUS, PREMIUM_SOURCES, PREMIUM_SOURCE_BONUS, SECONDHAND_SOURCES,
    SECONDHAND_SOURCE_BONUS, SUSTAINABLE_MATERIALS,
};
use modaics_core::Provenance;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const MIN_PRICE: Decimal = dec!(5.00);
pub const DEFAULT_CURRENCY: &str = "AUD";

const UNKNOWN_CONDITION_MULTIPLIER: Decimal = dec!(0.40);
const RANGE_LOW: Decimal = dec!(0.8);
const RANGE_HIGH: Decimal = dec!(1.2);

/// Listing condition vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Excellent,
    Good,
    Fair,
}

impl Condition {
    /// Case-insensitive parse; `None` for anything outside the vocabulary
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "new" => Some(Condition::New),
            "excellent" => Some(Condition::Excellent),
            "good" => Some(Condition::Good),
            "fair" => Some(Condition::Fair),
            _ => None,
        }
    }

    /// Condition a photo grade prices as; D and F both price as fair
    pub fn from_grade(grade: &str) -> Self {
        match grade.trim().to_ascii_uppercase().as_str() {
            "A" => Condition::New,
            "B" => Condition::Excellent,
            "C" => Condition::Good,
            _ => Condition::Fair,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Excellent => "excellent",
            Condition::Good => "good",
            Condition::Fair => "fair",
        }
    }

    /// Share of the base value retained
    pub fn multiplier(self) -> Decimal {
        match self {
            Condition::New => dec!(0.85),
            Condition::Excellent => dec!(0.70),
            Condition::Good => dec!(0.50),
            Condition::Fair => dec!(0.30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceConfidence {
    Low,
    Medium,
    High,
}

/// Every multiplier and bonus that went into an estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceFactors {
    pub base: Decimal,
    pub condition_multiplier: Decimal,
    pub brand_multiplier: Decimal,
    pub sustainability_bonus: Decimal,
    pub rarity_multiplier: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub recommended: Decimal,
    pub min: Decimal,
    pub max: Decimal,
    pub currency: String,
    pub confidence: PriceConfidence,
    pub factors: PriceFactors,
    pub explanation: String,
}

/// Inputs of one estimate
#[derive(Debug, Clone, Default)]
pub struct PriceRequest<'a> {
    pub category: &'a str,
    pub condition: &'a str,
    pub brand: Option<&'a str>,
    pub provenance: Option<&'a Provenance>,
    pub original_price: Option<Decimal>,
}

impl<'a> PriceRequest<'a> {
    #[inline]
    #[must_use]
    pub fn new(category: &'a str, condition: &'a str) -> Self {
        Self {
            category,
            condition,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn with_brand(mut self, brand: &'a str) -> Self {
        self.brand = Some(brand);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_provenance(mut self, provenance: &'a Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_original_price(mut self, price: Decimal) -> Self {
        self.original_price = Some(price);
        self
    }
}

/// Stateless pricing engine
#[derive(Debug, Clone)]
pub struct PricingEngine {
    currency: String,
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY)
    }
}

impl PricingEngine {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }

    pub fn estimate(&self, request: &PriceRequest<'_>) -> PriceEstimate {
        let original_price = request.original_price.filter(|p| *p > Decimal::ZERO);
        let base = original_price
            .or_else(|| category_base_price(request.category))
            .unwrap_or(DEFAULT_BASE_PRICE);

        let condition_multiplier = Condition::parse(request.condition)
            .map(Condition::multiplier)
            .unwrap_or(UNKNOWN_CONDITION_MULTIPLIER);

        let known_brand_multiplier = request.brand.and_then(brand_multiplier);
        let brand_multiplier = known_brand_multiplier.unwrap_or(Decimal::ONE);

        let sustainability_bonus = request
            .provenance
            .map(sustainability_bonus)
            .unwrap_or(Decimal::ZERO);

        let rarity_multiplier = Decimal::ONE;

        let raw = base * condition_multiplier * brand_multiplier * rarity_multiplier + sustainability_bonus;
        let recommended = cents(raw, RoundingStrategy::MidpointAwayFromZero).max(MIN_PRICE);
        let min = cents(recommended * RANGE_LOW, RoundingStrategy::MidpointNearestEven);
        let max = cents(recommended * RANGE_HIGH, RoundingStrategy::MidpointNearestEven);

        let confidence = confidence(
            category_base_price(request.category).is_some(),
            known_brand_multiplier.is_some(),
            original_price.is_some(),
        );

        PriceEstimate {
            explanation: explanation(request, recommended),
            recommended,
            min,
            max,
            currency: self.currency.clone(),
            confidence,
            factors: PriceFactors {
                base,
                condition_multiplier,
                brand_multiplier,
                sustainability_bonus,
                rarity_multiplier,
            },
        }
    }
}

/// Bonus for second-life sourcing, sustainable materials and certifications, capped
pub fn sustainability_bonus(provenance: &Provenance) -> Decimal {
    let mut bonus = Decimal::ZERO;

    if let Some(source) = provenance.source.as_deref() {
        let source = source.trim().to_lowercase();
        if PREMIUM_SOURCES.contains(&source.as_str()) {
            bonus += PREMIUM_SOURCE_BONUS;
        } else if SECONDHAND_SOURCES.contains(&source.as_str()) {
            bonus += SECONDHAND_SOURCE_BONUS;
        }
    }

    let has_sustainable_material = provenance.materials.iter().any(|material| {
        let material = material.to_lowercase();
        SUSTAINABLE_MATERIALS.iter().any(|m| material.contains(m))
    });
    if has_sustainable_material {
        bonus += MATERIAL_BONUS;
    }

    for certification in &provenance.certifications {
        let certification = certification.to_lowercase();
        if let Some((_, value)) = CERTIFICATION_BONUSES
            .iter()
            .find(|(name, _)| certification.contains(name))
        {
            bonus += *value;
        }
    }

    bonus.min(MAX_SUSTAINABILITY_BONUS)
}

fn confidence(known_category: bool, known_brand: bool, has_original_price: bool) -> PriceConfidence {
    let score = u8::from(known_category) + 2 * u8::from(known_brand) + 2 * u8::from(has_original_price);
    match score {
        s if s >= 4 => PriceConfidence::High,
        s if s >= 2 => PriceConfidence::Medium,
        _ => PriceConfidence::Low,
    }
}

fn explanation(request: &PriceRequest<'_>, recommended: Decimal) -> String {
    let mut parts = vec![format!("Based on {} category pricing", request.category)];

    if let Some(brand) = request.brand.filter(|b| !b.trim().is_empty()) {
        parts.push(format!("with {} brand value", brand));
    }
    parts.push(format!("adjusted for {} condition", request.condition));

    if let Some(provenance) = request.provenance {
        if let Some(source) = provenance.source.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!("as a {} item", source));
        }
        if !provenance.certifications.is_empty() {
            let certs: Vec<&str> = provenance
                .certifications
                .iter()
                .take(2)
                .map(String::as_str)
                .collect();
            parts.push(format!("with {} certification", certs.join(", ")));
        }
    }

    format!("{}. Estimated fair value: ${}", parts.join(" "), recommended)
}

/// Round to exactly two decimal places
fn cents(value: Decimal, strategy: RoundingStrategy) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, strategy);
    rounded.rescale(2);
    rounded
}
