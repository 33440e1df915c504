//! Heat color ramp for normalized density values.
//!
//! Low densities read as pale/cool, high densities as hot/saturated. The ramp
//! is a chain of color stops with linear interpolation in between, so it is
//! continuous at every band boundary.

use hazard_common::ValueRange;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
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

    pub const fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A ramp stop: at normalized position `at` the ramp is exactly `color`.
#[derive(Debug, Clone, Copy)]
struct ColorStop {
    at: f64,
    color: Color,
}

// Band edges at 0.15, 0.35, 0.55 and 0.75. The t = 0 stop has non-zero alpha:
// degenerate grids (every positive cell equal) normalize to 0 and still draw.
const HEAT_STOPS: [ColorStop; 6] = [
    ColorStop { at: 0.00, color: Color::new(170, 225, 255, 90) },  // pale cyan
    ColorStop { at: 0.15, color: Color::new(0, 150, 255, 153) },    // blue
    ColorStop { at: 0.35, color: Color::new(0, 200, 150, 166) },    // teal/green
    ColorStop { at: 0.55, color: Color::new(200, 220, 0, 191) },    // yellow-green
    ColorStop { at: 0.75, color: Color::new(255, 110, 0, 217) },    // orange
    ColorStop { at: 1.00, color: Color::new(200, 0, 0, 255) },      // deep red
];

/// Scale `value` into `[0, 1]` relative to `min..max`.
///
/// `min`/`max` are the positive-only extremes of the grid. When the span is
/// zero or not finite the result is 0 (the low end of the ramp) instead of
/// NaN or infinity. Results are clamped, so the function is monotonically
/// non-decreasing in `value`.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if !span.is_finite() || span <= 0.0 {
        return 0.0;
    }
    let t = (value - min) / span;
    if t.is_nan() {
        return 0.0;
    }
    t.clamp(0.0, 1.0)
}

/// [`normalize`] against a grid's positive value range.
pub fn normalize_in(value: f64, range: &ValueRange) -> f64 {
    normalize(value, range.min, range.max)
}

/// Map a normalized density to its heat color.
///
/// Total over all inputs: `t` is clamped to `[0, 1]` and NaN maps to the
/// low end.
pub fn color_for(t: f64) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    for pair in HEAT_STOPS.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if t <= hi.at {
            let local = (t - lo.at) / (hi.at - lo.at);
            return interpolate_color(lo.color, hi.color, local);
        }
    }

    HEAT_STOPS[HEAT_STOPS.len() - 1].color
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| -> u8 {
        (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
    };

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// Normalized band edges of the ramp, including 0 and 1.
pub fn band_edges() -> impl Iterator<Item = f64> {
    HEAT_STOPS.iter().map(|s| s.at)
}
