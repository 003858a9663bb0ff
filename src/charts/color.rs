//! Sequential color scale for the choropleth ("Oranges").

/// RGB triple used by both the egui and plotters backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const STEEL_BLUE: Rgb = Rgb(70, 130, 180);
    pub const RED: Rgb = Rgb(255, 0, 0);

    pub fn to_egui(self) -> egui::Color32 {
        egui::Color32::from_rgb(self.0, self.1, self.2)
    }

    pub fn to_plotters(self) -> plotters::style::RGBColor {
        plotters::style::RGBColor(self.0, self.1, self.2)
    }
}

/// ColorBrewer "Oranges", light to dark.
const ORANGES: [Rgb; 9] = [
    Rgb(0xff, 0xf5, 0xeb),
    Rgb(0xfe, 0xe6, 0xce),
    Rgb(0xfd, 0xd0, 0xa2),
    Rgb(0xfd, 0xae, 0x6b),
    Rgb(0xfd, 0x8d, 0x3c),
    Rgb(0xf1, 0x69, 0x13),
    Rgb(0xd9, 0x48, 0x01),
    Rgb(0xa6, 0x36, 0x03),
    Rgb(0x7f, 0x27, 0x04),
];

/// Maps `[0, max]` onto the Oranges ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequentialScale {
    min: f64,
    max: f64,
}

impl SequentialScale {
    pub fn new(domain: (f64, f64)) -> Self {
        Self {
            min: domain.0,
            max: domain.1,
        }
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Position of `value` in the domain, clamped to `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if !value.is_finite() || span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> Rgb {
        interpolate_oranges(self.normalize(value))
    }
}

/// Piecewise-linear interpolation through the Oranges stops.
pub fn interpolate_oranges(t: f64) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (ORANGES.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(ORANGES.len() - 2);
    let frac = scaled - lower as f64;

    let a = ORANGES[lower];
    let b = ORANGES[lower + 1];
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_ramp() {
        assert_eq!(interpolate_oranges(0.0), ORANGES[0]);
        assert_eq!(interpolate_oranges(1.0), ORANGES[8]);
        assert_eq!(interpolate_oranges(0.5), ORANGES[4]);
    }

    #[test]
    fn scale_clamps_and_handles_degenerate_domain() {
        let scale = SequentialScale::new((0.0, 50.0));
        assert_eq!(scale.color(0.0), ORANGES[0]);
        assert_eq!(scale.color(50.0), ORANGES[8]);
        assert_eq!(scale.color(500.0), ORANGES[8]);
        assert_eq!(scale.normalize(25.0), 0.5);

        let empty = SequentialScale::new((0.0, 0.0));
        assert_eq!(empty.color(10.0), ORANGES[0]);
        assert_eq!(empty.color(f64::NAN), ORANGES[0]);
    }
}
