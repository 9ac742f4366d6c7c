use std::collections::{BTreeMap, BTreeSet};

use palette::{Hsl, IntoColor, Srgb};

use crate::data::CellValue;

/// An 8-bit RGB triple, converted to the UI or chart colour type at the edge.
pub type Rgb = [u8; 3];

pub const DEFAULT_COLOR: Rgb = [135, 206, 235];

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            [
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            ]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: cell value → colour
// ---------------------------------------------------------------------------

/// Maps the unique values of a chosen column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<CellValue, Rgb>,
    default_color: Rgb,
}

impl ColorMap {
    /// Build a colour map from a column's unique values.
    pub fn new(unique_values: &BTreeSet<CellValue>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping: BTreeMap<CellValue, Rgb> = unique_values
            .iter()
            .cloned()
            .zip(palette)
            .collect();

        ColorMap {
            mapping,
            default_color: DEFAULT_COLOR,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &CellValue) -> Rgb {
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
    fn palette_has_distinct_colours() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        let unique: BTreeSet<Rgb> = p.iter().copied().collect();
        assert_eq!(unique.len(), 4);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_values_get_the_default() {
        let values: BTreeSet<CellValue> = [CellValue::from("A"), CellValue::from("B")].into_iter().collect();
        let map = ColorMap::new(&values);
        assert_ne!(map.color_for(&"A".into()), map.color_for(&"B".into()));
        assert_eq!(map.color_for(&"Z".into()), DEFAULT_COLOR);
    }
}
