use serde::{Deserialize, Serialize};

/// One ranked label from a prompt bank
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributePrediction {
    pub label: String,
    /// In [0, 1], rounded to 3 decimals
    pub confidence: f32,
}

impl AttributePrediction {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// One palette cluster of a garment photo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedColor {
    /// Nearest fashion palette name
    pub name: String,
    pub hex: String,
    pub rgb: (u8, u8, u8),
    /// Share of foreground pixels in [0, 1]
    pub percentage: f32,
    pub is_dominant: bool,
}

impl ExtractedColor {
    pub fn hex_of(rgb: (u8, u8, u8)) -> String {
        format!("#{:02x}{:02x}{:02x}", rgb.0, rgb.1, rgb.2)
    }
}

/// Round to 3 decimals, the precision every reported score uses
#[inline]
pub fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_of() {
        assert_eq!(ExtractedColor::hex_of((255, 0, 128)), "#ff0080");
        assert_eq!(ExtractedColor::hex_of((0, 0, 0)), "#000000");
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.12345), 0.123);
        assert_eq!(round3(0.9996), 1.0);
    }
}
