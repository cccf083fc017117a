//! Dominant colour extraction
//!
//! Resize, drop likely background pixels, cluster the rest with k-means and
//! name each centroid from the fashion palette.

use crate::kmeans::{kmeans, KMeansParams, Point};
use crate::palette::nearest_color_name;
use image::imageops::{self, FilterType};
use modaics_core::{Error, ExtractedColor, GarmentImage, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// Share above which a cluster counts toward colour diversity
const DIVERSITY_THRESHOLD: f32 = 0.1;
/// A garment is not multicoloured if its top cluster reaches this share
const SINGLE_COLOR_SHARE: f32 = 0.6;
/// Minimum foreground pixels per requested cluster
const PIXELS_PER_CLUSTER: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorExtractorConfig {
    /// Upper bound on clusters
    pub n_colors: usize,
    /// Images are resized to `resize_dim` x `resize_dim` before clustering
    pub resize_dim: u32,
    /// Fewer foreground pixels than this yields the "Unknown" placeholder
    pub min_pixels: usize,
    pub remove_background: bool,
    pub seed: u64,
    pub restarts: usize,
    pub max_iterations: usize,
}

impl Default for ColorExtractorConfig {
    fn default() -> Self {
        Self {
            n_colors: 5,
            resize_dim: 150,
            min_pixels: 100,
            remove_background: true,
            seed: 42,
            restarts: 10,
            max_iterations: 300,
        }
    }
}

impl ColorExtractorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_colors == 0 {
            return Err(Error::InvalidConfig("n_colors must be positive".to_string()));
        }
        if self.resize_dim == 0 {
            return Err(Error::InvalidConfig("resize_dim must be positive".to_string()));
        }
        if self.restarts == 0 || self.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "restarts and max_iterations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Colour summary of one garment photo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColorAnalysis {
    /// Sorted by percentage, dominant first
    pub colors: Vec<ExtractedColor>,
    pub dominant: ExtractedColor,
    pub color_count: usize,
    pub is_multicolored: bool,
    /// Clusters holding more than 10% of the garment
    pub diversity: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ColorExtractor {
    config: ColorExtractorConfig,
}

impl ColorExtractor {
    pub fn new(config: ColorExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ColorExtractorConfig {
        &self.config
    }

    /// Ordered colour clusters; never empty, exactly one dominant
    pub fn extract(&self, image: &GarmentImage) -> Vec<ExtractedColor> {
        let started = Instant::now();
        let dim = self.config.resize_dim;
        let resized = imageops::resize(image.pixels(), dim, dim, FilterType::Lanczos3);

        let points: Vec<Point> = resized
            .pixels()
            .map(|p| (p.0[0], p.0[1], p.0[2]))
            .filter(|&rgb| !self.config.remove_background || !is_background(rgb))
            .map(|(r, g, b)| [r as f32, g as f32, b as f32])
            .collect();

        if points.len() < self.config.min_pixels {
            warn!(
                "Only {} foreground pixels after background removal, reporting unknown colour",
                points.len()
            );
            return vec![unknown_color()];
        }

        let k = self.config.n_colors.min(points.len() / PIXELS_PER_CLUSTER).max(2);
        let clustering = kmeans(
            &points,
            KMeansParams {
                k,
                restarts: self.config.restarts,
                max_iterations: self.config.max_iterations,
                seed: self.config.seed,
            },
        );

        let total = points.len();
        let mut clusters: Vec<(usize, Point)> = clustering
            .counts()
            .into_iter()
            .zip(clustering.centroids.iter().copied())
            .filter(|(count, _)| *count > 0)
            .collect();
        // Stable: equal counts keep cluster order
        clusters.sort_by(|a, b| b.0.cmp(&a.0));

        let colors: Vec<ExtractedColor> = clusters
            .into_iter()
            .enumerate()
            .map(|(i, (count, centroid))| {
                let rgb = (
                    truncate_channel(centroid[0]),
                    truncate_channel(centroid[1]),
                    truncate_channel(centroid[2]),
                );
                ExtractedColor {
                    name: nearest_color_name(rgb).to_string(),
                    hex: ExtractedColor::hex_of(rgb),
                    rgb,
                    // Floor to 3 decimals so shares never sum above 1
                    percentage: (count * 1000 / total) as f32 / 1000.0,
                    is_dominant: i == 0,
                }
            })
            .collect();

        debug!(
            "Extracted {} colours from {} pixels (k={}, inertia={:.1}) in {:?}",
            colors.len(),
            total,
            k,
            clustering.inertia,
            started.elapsed()
        );
        colors
    }

    /// Colours plus diversity metadata
    pub fn analyze(&self, image: &GarmentImage) -> ColorAnalysis {
        summarize(self.extract(image))
    }
}

fn summarize(colors: Vec<ExtractedColor>) -> ColorAnalysis {
    let dominant = colors.first().cloned().unwrap_or_else(unknown_color);
    let diversity = colors
        .iter()
        .filter(|c| c.percentage > DIVERSITY_THRESHOLD)
        .count();
    let is_multicolored = diversity >= 2 && dominant.percentage < SINGLE_COLOR_SHARE;

    ColorAnalysis {
        color_count: colors.len(),
        colors,
        dominant,
        is_multicolored,
        diversity,
    }
}

/// Shadows, blown highlights and near-grey bright pixels
pub fn is_background((r, g, b): (u8, u8, u8)) -> bool {
    let brightness = (r as f32 + g as f32 + b as f32) / 3.0;
    if !(20.0..=245.0).contains(&brightness) {
        return true;
    }

    let max = r.max(g).max(b) as f32;
    let min = r.min(g).min(b) as f32;
    let saturation = if max > 0.0 { (max - min) / max } else { 0.0 };

    saturation < 0.05 && brightness > 200.0
}

fn unknown_color() -> ExtractedColor {
    ExtractedColor {
        name: "Unknown".to_string(),
        hex: "#808080".to_string(),
        rgb: (128, 128, 128),
        percentage: 1.0,
        is_dominant: true,
    }
}

#[inline]
fn truncate_channel(value: f32) -> u8 {
    value.clamp(0.0, 255.0) as u8
}
