//! # Modaics Pricing
//!
//! Fair-value estimates for secondhand garments from category, condition,
//! brand and provenance. Pure functions over decimal arithmetic; no I/O.
//!
//! ```rust
//! use modaics_pricing::{PriceRequest, PricingEngine};
//! use rust_decimal_macros::dec;
//!
//! let estimate = PricingEngine::default().estimate(&PriceRequest::new("dress", "new"));
//! assert_eq!(estimate.recommended, dec!(102.00));
//! assert_eq!(estimate.min, dec!(81.60));
//! ```

pub mod engine;
pub mod tables;

pub use engine::{
    sustainability_bonus, Condition, PriceConfidence, PriceEstimate, PriceFactors, PriceRequest, PricingEngine,
    DEFAULT_CURRENCY, MIN_PRICE,
};
pub use tables::{brand_multiplier, brand_tier, canonical_category, category_base_price, BrandTier};
