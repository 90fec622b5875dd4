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
            let hsl = Hsl::new(hue, 0.75, 0.55);
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
// Panel-type colour map
// ---------------------------------------------------------------------------

/// Maps each panel-type label to a stable distinct colour so a panel keeps
/// its colour across every chart and tab.
#[derive(Debug, Clone, Default)]
pub struct PanelColors {
    mapping: BTreeMap<String, Color32>,
}

impl PanelColors {
    /// Build a colour map over the dataset's panel types.
    pub fn new(panel_types: &BTreeSet<String>) -> Self {
        let palette = generate_palette(panel_types.len());
        let mapping = panel_types
            .iter()
            .zip(palette)
            .map(|(p, c)| (p.clone(), c))
            .collect();
        PanelColors { mapping }
    }

    /// Colour for a panel type; grey for labels not seen at build time.
    pub fn color_for(&self, panel_type: &str) -> Color32 {
        self.mapping
            .get(panel_type)
            .copied()
            .unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Heatmap ramp
// ---------------------------------------------------------------------------

/// Yellow → orange → red ramp for heatmap cells, `t` in `[0, 1]`.
pub fn heat_color(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    // Hue 55° (yellow) down to 0° (red), darkening slightly towards the top.
    let hsl = Hsl::new(55.0 * (1.0 - t), 0.9, 0.75 - 0.3 * t);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Readable text colour on top of a heatmap cell.
pub fn heat_text_color(t: f64) -> Color32 {
    if t > 0.6 {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}
