//! Reference price, brand and provenance tables

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Used when the category has no table entry
pub const DEFAULT_BASE_PRICE: Decimal = dec!(75.00);

/// Estimated original retail price per category
pub const CATEGORY_BASE_PRICES: [(&str, Decimal); 17] = [
    ("dress", dec!(120.00)),
    ("shirt", dec!(60.00)),
    ("blouse", dec!(70.00)),
    ("t-shirt", dec!(35.00)),
    ("pants", dec!(80.00)),
    ("jeans", dec!(90.00)),
    ("skirt", dec!(65.00)),
    ("jacket", dec!(150.00)),
    ("coat", dec!(200.00)),
    ("sweater", dec!(85.00)),
    ("cardigan", dec!(75.00)),
    ("shorts", dec!(45.00)),
    ("activewear", dec!(70.00)),
    ("swimwear", dec!(60.00)),
    ("accessory", dec!(50.00)),
    ("shoes", dec!(100.00)),
    ("bag", dec!(150.00)),
];

/// Classifier labels that price like another category
const CATEGORY_ALIASES: [(&str, &str); 15] = [
    ("sneakers", "shoes"),
    ("boots", "shoes"),
    ("high heels", "shoes"),
    ("sandals", "shoes"),
    ("handbag", "bag"),
    ("trousers", "pants"),
    ("denim jacket", "jacket"),
    ("hoodie", "sweater"),
    ("swimsuit", "swimwear"),
    ("athletic top", "activewear"),
    ("athletic leggings", "activewear"),
    ("scarf", "accessory"),
    ("hat", "accessory"),
    ("belt", "accessory"),
    ("vest", "jacket"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandTier {
    UltraFastFashion = 1,
    MidTier = 2,
    Sustainable = 3,
    Premium = 4,
    Luxury = 5,
}

impl BrandTier {
    /// Numeric tier, 1 (ultra fast fashion) to 5 (luxury)
    #[inline]
    pub fn level(self) -> u8 {
        self as u8
    }
}

/// Known brands with their price multiplier
pub const BRANDS: [(&str, BrandTier, Decimal); 22] = [
    ("gucci", BrandTier::Luxury, dec!(2.5)),
    ("prada", BrandTier::Luxury, dec!(2.5)),
    ("chanel", BrandTier::Luxury, dec!(3.0)),
    ("hermes", BrandTier::Luxury, dec!(3.5)),
    ("louis vuitton", BrandTier::Luxury, dec!(2.5)),
    ("theory", BrandTier::Premium, dec!(1.5)),
    ("cos", BrandTier::Premium, dec!(1.3)),
    ("everlane", BrandTier::Premium, dec!(1.2)),
    ("reformation", BrandTier::Premium, dec!(1.4)),
    ("patagonia", BrandTier::Premium, dec!(1.4)),
    ("eileen fisher", BrandTier::Premium, dec!(1.4)),
    ("j.crew", BrandTier::MidTier, dec!(1.1)),
    ("banana republic", BrandTier::MidTier, dec!(1.0)),
    ("zara", BrandTier::MidTier, dec!(0.8)),
    ("h&m", BrandTier::MidTier, dec!(0.6)),
    ("uniqlo", BrandTier::MidTier, dec!(0.9)),
    ("madewell", BrandTier::MidTier, dec!(1.2)),
    ("organic basics", BrandTier::Sustainable, dec!(1.3)),
    ("tentree", BrandTier::Sustainable, dec!(1.3)),
    ("kotn", BrandTier::Sustainable, dec!(1.3)),
    ("pact", BrandTier::Sustainable, dec!(1.2)),
    ("kuyichi", BrandTier::Sustainable, dec!(1.2)),
];

/// Tier-only brands; they carry no price multiplier
pub const ULTRA_FAST_FASHION: [&str; 5] = ["shein", "temu", "fashion nova", "boohoo", "prettylittlething"];

pub const SUSTAINABLE_MATERIALS: [&str; 11] = [
    "organic cotton",
    "hemp",
    "linen",
    "tencel",
    "lyocell",
    "recycled polyester",
    "recycled nylon",
    "bamboo",
    "peace silk",
    "alpaca",
    "merino wool",
];

/// First substring match per certification counts
pub const CERTIFICATION_BONUSES: [(&str, Decimal); 6] = [
    ("gots", dec!(10.00)),
    ("fair trade", dec!(10.00)),
    ("b corp", dec!(8.00)),
    ("bluesign", dec!(8.00)),
    ("oeko-tex", dec!(5.00)),
    ("cradle to cradle", dec!(10.00)),
];

pub const PREMIUM_SOURCES: [&str; 3] = ["vintage", "antique", "designer archive"];
pub const SECONDHAND_SOURCES: [&str; 2] = ["secondhand", "consignment"];

pub const PREMIUM_SOURCE_BONUS: Decimal = dec!(15.00);
pub const SECONDHAND_SOURCE_BONUS: Decimal = dec!(5.00);
pub const MATERIAL_BONUS: Decimal = dec!(5.00);
pub const MAX_SUSTAINABILITY_BONUS: Decimal = dec!(50.00);

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Table base price for a category, if known
pub fn category_base_price(category: &str) -> Option<Decimal> {
    let key = normalize(category);
    CATEGORY_BASE_PRICES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, price)| *price)
}

/// Map a free-form or classifier category label onto a pricing category
///
/// Unknown labels come back lowercased and trimmed.
pub fn canonical_category(label: &str) -> String {
    let key = normalize(label);
    CATEGORY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, category)| (*category).to_string())
        .unwrap_or(key)
}

/// Price multiplier of a known brand
pub fn brand_multiplier(brand: &str) -> Option<Decimal> {
    let key = normalize(brand);
    BRANDS
        .iter()
        .find(|(name, _, _)| *name == key)
        .map(|(_, _, multiplier)| *multiplier)
}

/// Tier of a brand; `None` when the brand is unknown
pub fn brand_tier(brand: &str) -> Option<BrandTier> {
    let key = normalize(brand);
    if ULTRA_FAST_FASHION.contains(&key.as_str()) {
        return Some(BrandTier::UltraFastFashion);
    }
    BRANDS
        .iter()
        .find(|(name, _, _)| *name == key)
        .map(|(_, tier, _)| *tier)
}
