//! Named fashion colours and perceptual nearest-colour lookup

/// Reference palette: name and sRGB value
pub const FASHION_PALETTE: [(&str, (u8, u8, u8)); 40] = [
    // Neutrals
    ("Black", (0, 0, 0)),
    ("Charcoal", (54, 69, 79)),
    ("White", (255, 255, 255)),
    ("Off-White", (250, 249, 246)),
    ("Cream", (255, 253, 208)),
    ("Navy", (0, 0, 128)),
    // Blues
    ("Royal Blue", (65, 105, 225)),
    ("Sky Blue", (135, 206, 235)),
    ("Denim Blue", (21, 96, 189)),
    ("Light Blue", (173, 216, 230)),
    // Reds and pinks
    ("Red", (220, 20, 60)),
    ("Burgundy", (128, 0, 32)),
    ("Coral", (255, 127, 80)),
    ("Pink", (255, 192, 203)),
    ("Hot Pink", (255, 105, 180)),
    ("Blush", (222, 93, 131)),
    // Greens
    ("Forest Green", (34, 139, 34)),
    ("Olive", (128, 128, 0)),
    ("Sage", (138, 154, 140)),
    ("Mint", (189, 252, 201)),
    ("Emerald", (80, 200, 120)),
    ("Teal", (0, 128, 128)),
    ("Turquoise", (64, 224, 208)),
    // Yellows and oranges
    ("Yellow", (255, 255, 0)),
    ("Mustard", (255, 173, 1)),
    ("Gold", (255, 215, 0)),
    ("Orange", (255, 165, 0)),
    ("Rust", (183, 65, 14)),
    ("Terracotta", (226, 114, 91)),
    // Purples
    ("Purple", (128, 0, 128)),
    ("Lavender", (230, 230, 250)),
    ("Mauve", (224, 176, 255)),
    // Earth tones
    ("Grey", (128, 128, 128)),
    ("Silver", (192, 192, 192)),
    ("Taupe", (188, 152, 126)),
    ("Beige", (245, 245, 220)),
    ("Tan", (210, 180, 140)),
    ("Brown", (139, 69, 19)),
    ("Chocolate", (123, 63, 0)),
    ("Camel", (193, 154, 107)),
];

/// Red-mean weighted RGB distance
///
/// Cheap approximation of perceived difference: green dominates, and the
/// red/blue weights shift with how red the pair is.
#[inline]
pub fn color_distance(a: (u8, u8, u8), b: (u8, u8, u8)) -> f32 {
    let r_mean = (a.0 as f32 + b.0 as f32) / 2.0;
    let dr = a.0 as f32 - b.0 as f32;
    let dg = a.1 as f32 - b.1 as f32;
    let db = a.2 as f32 - b.2 as f32;

    ((2.0 + r_mean / 256.0) * dr * dr + 4.0 * dg * dg + (2.0 + (255.0 - r_mean) / 256.0) * db * db).sqrt()
}

/// Nearest palette name; the first entry wins on equal distance
pub fn nearest_color_name(rgb: (u8, u8, u8)) -> &'static str {
    let mut best = FASHION_PALETTE[0].0;
    let mut best_distance = f32::INFINITY;
    for (name, reference) in FASHION_PALETTE.iter() {
        let distance = color_distance(rgb, *reference);
        if distance < best_distance {
            best_distance = distance;
            best = name;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_palette_entries_map_to_themselves() {
        for (name, rgb) in FASHION_PALETTE.iter() {
            assert_eq!(nearest_color_name(*rgb), *name);
        }
    }

    #[test]
    fn test_nearest_color() {
        assert_eq!(nearest_color_name((5, 5, 5)), "Black");
        assert_eq!(nearest_color_name((10, 10, 120)), "Navy");
        assert_eq!(nearest_color_name((200, 30, 50)), "Red");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = (10, 200, 30);
        let b = (240, 10, 90);
        assert_eq!(color_distance(a, b), color_distance(b, a));
        assert_eq!(color_distance(a, a), 0.0);
    }
}
