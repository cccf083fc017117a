//! Garment records as handed to the pipeline by the storage layer
//!
//! The JSON-shaped `story`, `provenance` and `style_attributes` columns are
//! decoded once into explicit optional-field structs. Absent keys become
//! `None` or empty lists, never errors.

use crate::embedding::Embedding;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Garment identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GarmentRef {
    Integer(u64),
    Uuid(Uuid),
    String(String),
}

impl std::fmt::Display for GarmentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GarmentRef::String(s) => write!(f, "{}", s),
            GarmentRef::Uuid(u) => write!(f, "{}", u),
            GarmentRef::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for GarmentRef {
    fn from(s: String) -> Self {
        GarmentRef::String(s)
    }
}

impl From<&str> for GarmentRef {
    fn from(s: &str) -> Self {
        GarmentRef::String(s.to_string())
    }
}

impl From<u64> for GarmentRef {
    fn from(i: u64) -> Self {
        GarmentRef::Integer(i)
    }
}

impl From<Uuid> for GarmentRef {
    fn from(u: Uuid) -> Self {
        GarmentRef::Uuid(u)
    }
}

/// Narrative attached to a listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Story {
    pub text: Option<String>,
    pub mood: Option<String>,
    pub occasion: Option<String>,
    pub memories: Vec<String>,
}

impl Story {
    /// Searchable text: text, mood and occasion joined by spaces
    pub fn searchable_text(&self) -> String {
        [&self.text, &self.mood, &self.occasion]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Origin and sustainability data
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Provenance {
    /// new, secondhand, vintage, consignment, ...
    pub source: Option<String>,
    pub materials: Vec<String>,
    pub made_in: Option<String>,
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StyleAttributes {
    pub colors: Vec<String>,
    pub patterns: Vec<String>,
    pub style_tags: Vec<String>,
    pub season: Option<String>,
}

impl StyleAttributes {
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
            && self.patterns.is_empty()
            && self.style_tags.is_empty()
            && self.season.is_none()
    }
}

/// A listed garment, consumed read-only by discovery and pricing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Garment {
    pub id: GarmentRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<GarmentRef>,
    pub category: String,
    /// new, excellent, good or fair
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub story: Option<Story>,
    #[serde(default)]
    pub provenance: Option<Provenance>,
    #[serde(default, alias = "style")]
    pub style_attributes: Option<StyleAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Embedding>,
    pub created_at: DateTime<Utc>,
}

impl Garment {
    #[inline]
    #[must_use]
    pub fn new(id: GarmentRef, category: impl Into<String>, condition: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_id: None,
            category: category.into(),
            condition: condition.into(),
            brand: None,
            size: String::new(),
            story: None,
            provenance: None,
            style_attributes: None,
            embedding: None,
            created_at,
        }
    }

    /// Decode a garment record from its JSON representation
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::InvalidInput(format!("malformed garment record: {}", e)))
    }

    #[inline]
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<GarmentRef>) -> Self {
        self.owner_id = Some(owner.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_story(mut self, story: Story) -> Self {
        self.story = Some(story);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_style(mut self, style: StyleAttributes) -> Self {
        self.style_attributes = Some(style);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }

    #[inline]
    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }

    pub fn story_text(&self) -> String {
        self.story.as_ref().map(Story::searchable_text).unwrap_or_default()
    }

    pub fn style(&self) -> Option<&StyleAttributes> {
        self.style_attributes.as_ref()
    }

    pub fn provenance_source(&self) -> Option<&str> {
        self.provenance
            .as_ref()
            .and_then(|p| p.source.as_deref())
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_with_defaults() {
        let garment = Garment::from_json(json!({
            "id": "g-1",
            "category": "dress",
            "condition": "good",
            "created_at": "2024-05-01T10:00:00Z",
            "story": {"text": "Worn to a wedding"},
            "style_attributes": {"colors": ["black"]}
        }))
        .unwrap();

        assert_eq!(garment.id, GarmentRef::String("g-1".to_string()));
        assert!(garment.brand.is_none());
        assert!(garment.provenance.is_none());
        let style = garment.style().unwrap();
        assert_eq!(style.colors, vec!["black".to_string()]);
        assert!(style.style_tags.is_empty());
        assert!(garment.story.as_ref().unwrap().memories.is_empty());
    }

    #[test]
    fn test_from_json_rejects_missing_category() {
        let err = Garment::from_json(json!({
            "id": 7,
            "condition": "good",
            "created_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_story_text_joins_parts() {
        let story = Story {
            text: Some("Found in Paris".to_string()),
            mood: Some("romantic".to_string()),
            occasion: None,
            memories: vec![],
        };
        assert_eq!(story.searchable_text(), "Found in Paris romantic");
    }

    #[test]
    fn test_garment_ref_variants() {
        assert_eq!(serde_json::to_string(&GarmentRef::from(42u64)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&GarmentRef::from("abc")).unwrap(), "\"abc\"");
        let parsed: GarmentRef = serde_json::from_str("\"6f1c1e3a-8a1f-4a55-9b37-2a7f5f8f2d10\"").unwrap();
        assert!(matches!(parsed, GarmentRef::Uuid(_)));
    }
}
