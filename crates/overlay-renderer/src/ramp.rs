//! Color ramps.
//!
//! A ramp is an ordered list of RGBA stops. The registry is built once at
//! startup and is read-only afterwards; render requests interpolate a ramp
//! to the number of class breaks they carry.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Name of the fallback ramp used when a request names an unknown one.
pub const DEFAULT_RAMP: &str = "blue-to-red";

/// Color value in RGBA format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xFF)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// "#rrggbbaa" notation used by the colors endpoint.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// Linear color interpolation.
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)) as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)) as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)) as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)) as u8,
    )
}

/// An ordered list of RGBA color stops.
#[derive(Debug, Clone)]
pub struct ColorRamp {
    stops: Vec<Color>,
}

impl ColorRamp {
    pub fn new(stops: Vec<Color>) -> Self {
        debug_assert!(!stops.is_empty(), "a ramp needs at least one stop");
        Self { stops }
    }

    pub fn stops(&self) -> &[Color] {
        &self.stops
    }

    /// Resample the ramp to exactly `n` colors by linear interpolation
    /// along the stop sequence.
    pub fn interpolate(&self, n: usize) -> Vec<Color> {
        if n == 0 {
            return Vec::new();
        }
        if n == 1 {
            return vec![self.stops[0]];
        }

        let span = (self.stops.len() - 1) as f32;
        (0..n)
            .map(|i| {
                let position = i as f32 / (n - 1) as f32 * span;
                let index = (position.floor() as usize).min(self.stops.len() - 2);
                interpolate_color(
                    self.stops[index],
                    self.stops[index + 1],
                    position - index as f32,
                )
            })
            .collect()
    }
}

macro_rules! ramp {
    ($($rgb:expr),+ $(,)?) => {
        ColorRamp::new(vec![$({
            let rgb: u32 = $rgb;
            Color::opaque((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
        }),+])
    };
}

static RAMPS: Lazy<BTreeMap<&'static str, ColorRamp>> = Lazy::new(|| {
    BTreeMap::from([
        (
            "blue-to-red",
            ramp![0x2791C3, 0x5DA1CA, 0x83B2D1, 0xA8C5D8, 0xCCDBE0, 0xE9D3C1, 0xDCAD92, 0xD08B6C, 0xC66E4B, 0xBD4E2E],
        ),
        (
            "green-to-red-orange",
            ramp![0x569543, 0x9EBD4D, 0xBBCA7A, 0xD9E2B2, 0xE4E7C4, 0xE6D6BE, 0xE3C193, 0xDFAC6C, 0xDB9842, 0xB96230],
        ),
        (
            "blue-to-yellow-to-red-heatmap",
            ramp![0x2A2E7F, 0x3D5AA9, 0x4698D3, 0x39C6F0, 0x76C9B3, 0xA8D050, 0xF6EB14, 0xFCB017, 0xF16022, 0xEE2C24],
        ),
        (
            "blue-to-red-heatmap",
            ramp![0x2A2E7F, 0x3D5AA9, 0x4698D3, 0x39C6F0, 0x9066BC, 0xC96CBE, 0xEB6BC0, 0xF16022, 0xEE2C24],
        ),
        (
            "dark-red-to-yellow-heatmap",
            ramp![0x68101A, 0x7F182A, 0xA33936, 0xCF3A27, 0xD54927, 0xE77124, 0xECBE1D, 0xF7DA22, 0xF9F5F0],
        ),
        (
            "purple-to-dark-purple-to-white-heatmap",
            ramp![0xA52278, 0x993086, 0x8C3C97, 0x6D328A, 0x4E2B81, 0x3B264B, 0x180B11, 0xFFFFFF],
        ),
        (
            "bold-land-use-qualitative",
            ramp![0xB29CC3, 0x4F8EBB, 0x8F9238, 0xC18437, 0xB5D6B1, 0xD378A6, 0xD4563C, 0xF9BE47],
        ),
        (
            "muted-terrain-qualitative",
            ramp![0xCEE1E8, 0x7CBCB5, 0x82B36D, 0x94C279, 0xD1DE8D, 0xEDECC3, 0xCCAFB4, 0xC99884],
        ),
    ])
});

/// Look up a ramp, falling back to the default blue-to-red ramp.
pub fn ramp_or_default(name: &str) -> &'static ColorRamp {
    RAMPS
        .get(name)
        .unwrap_or_else(|| &RAMPS[DEFAULT_RAMP])
}

/// Names of all registered ramps with their stops, for the colors endpoint.
pub fn ramp_names() -> impl Iterator<Item = (&'static str, &'static ColorRamp)> {
    RAMPS.iter().map(|(name, ramp)| (*name, ramp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_endpoints_are_stops() {
        let ramp = ramp_or_default(DEFAULT_RAMP);
        let colors = ramp.interpolate(5);

        assert_eq!(colors.len(), 5);
        assert_eq!(colors[0], ramp.stops()[0]);
        assert_eq!(colors[4], *ramp.stops().last().unwrap());
    }

    #[test]
    fn test_interpolate_to_more_colors_than_stops() {
        let ramp = ColorRamp::new(vec![Color::opaque(0, 0, 0), Color::opaque(100, 100, 100)]);
        let colors = ramp.interpolate(3);

        assert_eq!(colors[0], Color::opaque(0, 0, 0));
        assert_eq!(colors[1], Color::opaque(50, 50, 50));
        assert_eq!(colors[2], Color::opaque(100, 100, 100));
    }

    #[test]
    fn test_interpolate_degenerate_counts() {
        let ramp = ramp_or_default(DEFAULT_RAMP);
        assert!(ramp.interpolate(0).is_empty());
        assert_eq!(ramp.interpolate(1), vec![ramp.stops()[0]]);
    }

    #[test]
    fn test_unknown_name_falls_back() {
        let fallback = ramp_or_default("no-such-ramp");
        assert_eq!(fallback.stops(), ramp_or_default(DEFAULT_RAMP).stops());
    }

    #[test]
    fn test_registry_has_default() {
        assert!(ramp_names().any(|(name, _)| name == DEFAULT_RAMP));
    }

    #[test]
    fn test_hex_formatting() {
        assert_eq!(Color::opaque(0x27, 0x91, 0xC3).to_hex(), "#2791c3ff");
        assert_eq!(Color::transparent().to_hex(), "#00000000");
    }
}
