use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use bms_dash::CellValue;

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
// Color mapping: cell value → Color32
// ---------------------------------------------------------------------------

/// Maps unique values of a chosen column (the battery id) to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: String,
    mapping: BTreeMap<CellValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given column from its unique values.
    /// Nulls keep the default colour.
    pub fn new(column: &str, unique_values: &BTreeSet<CellValue>) -> Self {
        let values: Vec<&CellValue> = unique_values.iter().filter(|v| !v.is_null()).collect();
        let palette = generate_palette(values.len());
        let mapping: BTreeMap<CellValue, Color32> = values
            .into_iter()
            .zip(palette)
            .map(|(v, c)| (v.clone(), c))
            .collect();

        ColorMap {
            column: column.to_string(),
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &CellValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_is_distinct() {
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        let unique: BTreeSet<[u8; 4]> = colors.iter().map(|c| c.to_array()).collect();
        assert_eq!(unique.len(), 4);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn test_unknown_and_null_values_are_grey() {
        let values: BTreeSet<CellValue> = [
            CellValue::Text("A1".into()),
            CellValue::Text("A2".into()),
            CellValue::Null,
        ]
        .into_iter()
        .collect();
        let map = ColorMap::new("Battery ID", &values);
        let a1 = map.color_for(&CellValue::Text("A1".into()));
        let a2 = map.color_for(&CellValue::Text("A2".into()));
        assert_ne!(a1, Color32::GRAY);
        assert_ne!(a1, a2);
        assert_eq!(map.color_for(&CellValue::Null), Color32::GRAY);
        assert_eq!(map.color_for(&CellValue::Text("B9".into())), Color32::GRAY);
    }
}
