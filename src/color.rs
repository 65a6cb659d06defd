use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tag colours: tag → Color32
// ---------------------------------------------------------------------------

/// Gives each tag of the vocabulary a stable colour. Tags differing only in
/// case share a colour, matching how the tag filter compares them.
#[derive(Debug, Clone, Default)]
pub struct TagPalette {
    mapping: BTreeMap<String, Color32>,
}

impl TagPalette {
    pub fn new(vocabulary: &BTreeSet<String>) -> Self {
        let keys: BTreeSet<String> = vocabulary.iter().map(|t| t.to_lowercase()).collect();
        let palette = generate_palette(keys.len());
        TagPalette {
            mapping: keys.into_iter().zip(palette).collect(),
        }
    }

    /// Look up the colour for a tag.
    pub fn color_for(&self, tag: &str) -> Color32 {
        self.mapping
            .get(&tag.to_lowercase())
            .copied()
            .unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        assert_ne!(colors[0], colors[2]);
    }

    #[test]
    fn case_variants_share_a_colour() {
        let vocab: BTreeSet<String> = ["Politics", "politics", "Economy"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let palette = TagPalette::new(&vocab);
        assert_eq!(palette.color_for("Politics"), palette.color_for("POLITICS"));
        assert_ne!(palette.color_for("Politics"), palette.color_for("Economy"));
        assert_eq!(palette.color_for("unknown"), Color32::GRAY);
    }
}
