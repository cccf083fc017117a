//! Deterministic feature-hashing encoder
//!
//! A dependency-free backend that places text and images in one vector space.
//! Text is hashed from character trigrams and whole words. Images are reduced
//! to colour and tone words (weighted by pixel share) and hashed the same way,
//! so a photo of a navy garment lands near "navy blue colored clothing".
//!
//! Used as the default backend and in tests; a learned CLIP-style model plugs
//! in through [`Encoder`].

use crate::encoder::{Encoder, EncoderLoader};
use image::imageops;
use modaics_core::{Embedding, Error, GarmentImage, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

const THUMBNAIL_SIZE: u32 = 32;
const WORD_WEIGHT: f32 = 2.0;
const TRIGRAM_WEIGHT: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dimension: usize,
}

impl HashingEncoder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::InvalidConfig(
                "embedding dimension must be positive".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    /// Accumulate hashed trigram and word features of `text` into `vector`
    fn accumulate(&self, text: &str, weight: f32, vector: &mut [f32]) {
        let normalized = text.to_lowercase();

        for trigram in trigrams(&normalized) {
            vector[self.slot(&trigram)] += TRIGRAM_WEIGHT * weight;
        }
        for word in normalized.split_whitespace() {
            vector[self.slot(word)] += WORD_WEIGHT * weight;
        }
    }

    fn slot<T: Hash + ?Sized>(&self, feature: &T) -> usize {
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        (hasher.finish() as usize) % self.dimension
    }
}

impl Encoder for HashingEncoder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode_image(&self, image: &GarmentImage) -> Result<Embedding> {
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::InvalidInput("image has no pixels".to_string()));
        }

        let thumb = imageops::thumbnail(image.pixels(), THUMBNAIL_SIZE, THUMBNAIL_SIZE);
        let total = (thumb.width() * thumb.height()) as f32;

        let mut counts: Vec<(&'static str, u32)> = Vec::new();
        let mut brightness = 0.0f32;
        for pixel in thumb.pixels() {
            let [r, g, b] = pixel.0;
            let (word, value) = tone_word(r, g, b);
            brightness += value;
            match counts.iter_mut().find(|(w, _)| *w == word) {
                Some((_, n)) => *n += 1,
                None => counts.push((word, 1)),
            }
        }

        let mut vector = vec![0.0f32; self.dimension];
        for (word, n) in &counts {
            self.accumulate(word, *n as f32 / total, &mut vector);
        }

        let mean_brightness = brightness / total;
        if mean_brightness < 0.35 {
            self.accumulate("dark", 0.25, &mut vector);
        } else if mean_brightness > 0.7 {
            self.accumulate("light", 0.25, &mut vector);
        }

        Embedding::new(vector)
    }

    fn encode_text(&self, text: &str) -> Result<Embedding> {
        let mut vector = vec![0.0f32; self.dimension];
        self.accumulate(text, 1.0, &mut vector);
        Embedding::new(vector)
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

/// Loader for [`HashingEncoder`]
#[derive(Debug, Clone)]
pub struct HashingLoader {
    pub dimension: usize,
}

impl EncoderLoader for HashingLoader {
    fn load(&self) -> Result<Arc<dyn Encoder>> {
        Ok(Arc::new(HashingEncoder::new(self.dimension)?))
    }
}

/// Padded character trigrams
fn trigrams(text: &str) -> Vec<String> {
    let padded: Vec<char> = format!("  {}  ", text).chars().collect();
    padded.windows(3).map(|w| w.iter().collect()).collect()
}

/// Colour word for one pixel, plus its HSV value
fn tone_word(r: u8, g: u8, b: u8) -> (&'static str, f32) {
    let (r, g, b) = (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let value = max;
    let saturation = if max > 0.0 { (max - min) / max } else { 0.0 };

    if value < 0.15 {
        return ("black", value);
    }
    if saturation < 0.12 {
        let word = if value > 0.85 {
            "white"
        } else {
            "grey"
        };
        return (word, value);
    }
    if saturation < 0.3 && value > 0.75 {
        return ("beige", value);
    }

    let delta = max - min;
    let hue = if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let word = match hue {
        h if !(15.0..345.0).contains(&h) => {
            if value < 0.55 {
                "burgundy"
            } else {
                "red"
            }
        }
        h if h < 40.0 => {
            if value < 0.6 {
                "brown"
            } else {
                "orange"
            }
        }
        h if h < 70.0 => {
            if value < 0.55 {
                "olive"
            } else {
                "yellow"
            }
        }
        h if h < 160.0 => "green",
        h if h < 200.0 => "teal",
        h if h < 255.0 => {
            if value < 0.55 {
                "navy"
            } else {
                "blue"
            }
        }
        h if h < 290.0 => "purple",
        _ => "pink",
    };
    (word, value)
}
