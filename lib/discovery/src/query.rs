//! Discovery requests and responses

use modaics_core::{Error, Garment, GarmentRef, Result};
use serde::{Deserialize, Serialize};

/// Structured discovery request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiscoveryQuery {
    /// Natural-language description of what the shopper wants
    pub text: Option<String>,
    pub style_tags: Vec<String>,
    #[serde(flatten)]
    pub filter: CandidateFilter,
}

impl DiscoveryQuery {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn with_style_tags(mut self, tags: Vec<String>) -> Self {
        self.style_tags = tags;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_filter(mut self, filter: CandidateFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Text sent to the encoder: free text then `Style: tag1, tag2`
    ///
    /// `None` when there is nothing to search for, which ranks by recency.
    pub fn effective_text(&self) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();
        if let Some(text) = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            parts.push(text.to_string());
        }
        let tags: Vec<&str> = self
            .style_tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !tags.is_empty() {
            parts.push(format!("Style: {}", tags.join(", ")));
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Optional listing filters applied before ranking
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CandidateFilter {
    /// Case-insensitive substring of the garment category
    pub category: Option<String>,
    pub size: Option<String>,
    pub condition: Option<String>,
}

impl CandidateFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.size.is_none() && self.condition.is_none()
    }

    pub fn matches(&self, garment: &Garment) -> bool {
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if !garment.category.to_lowercase().contains(&category.to_lowercase()) {
                return false;
            }
        }
        if let Some(size) = self.size.as_deref().filter(|s| !s.is_empty()) {
            if garment.size != size {
                return false;
            }
        }
        if let Some(condition) = self.condition.as_deref().filter(|c| !c.is_empty()) {
            if !garment.condition.eq_ignore_ascii_case(condition) {
                return false;
            }
        }
        true
    }
}

/// One-based page selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    pub fn validate(&self, max_page_size: usize) -> Result<()> {
        if self.page == 0 {
            return Err(Error::InvalidInput("page must be at least 1".to_string()));
        }
        if self.page_size == 0 || self.page_size > max_page_size {
            return Err(Error::InvalidInput(format!(
                "page_size must be between 1 and {}",
                max_page_size
            )));
        }
        Ok(())
    }

    /// Number of pages needed for `total` results
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveryResult {
    pub garment_ref: GarmentRef,
    /// In [0, 1], rounded to 3 decimals
    pub similarity: f32,
    /// At most three human-readable reasons
    pub reasons: Vec<String>,
}

/// Summary of one ranking pass
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiscoveryStats {
    /// Garments considered after filtering
    pub candidates_count: usize,
    /// Garments that cleared the similarity threshold
    pub results_count: usize,
    pub avg_similarity: f32,
    pub best_similarity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveryPage {
    pub results: Vec<DiscoveryResult>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub pages: usize,
    pub stats: DiscoveryStats,
}
