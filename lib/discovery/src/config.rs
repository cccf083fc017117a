use modaics_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Thresholds and paging limits for discovery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Minimum similarity for free-text discovery results
    pub min_similarity: f32,
    /// Minimum similarity for similar-item results
    pub similar_min_similarity: f32,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.1,
            similar_min_similarity: 0.3,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_similarity", self.min_similarity),
            ("similar_min_similarity", self.similar_min_similarity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!("{} must be within [0, 1]", name)));
            }
        }
        if self.max_page_size == 0 {
            return Err(Error::InvalidConfig("max_page_size must be positive".to_string()));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(Error::InvalidConfig(format!(
                "default_page_size must be between 1 and {}",
                self.max_page_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DiscoveryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_page_size, 20);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let config = DiscoveryConfig {
            min_similarity: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = DiscoveryConfig {
            default_page_size: 200,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
