//! Heatmap color mapping
//!
//! Maps a value inside a [min, max] range onto a red → white → green blend.
//! Negative impact is red, the midpoint is white, positive impact is green.

use egui::Color32;
use serde::Serialize;

/// Gray returned when the range is degenerate (min == max)
pub const NEUTRAL_GRAY: [u8; 3] = [200, 200, 200];

/// Opacity used when the caller passes a non-finite opacity
pub const FALLBACK_OPACITY: f64 = 0.7;

/// An RGB color with a separate opacity in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HeatColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in [0, 1]
    pub a: f64,
}

impl HeatColor {
    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// CSS `rgba(...)` string
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }

    /// Convert for egui painting (unmultiplied alpha)
    pub fn to_color32(&self) -> Color32 {
        let alpha = (self.a * 255.0).round().clamp(0.0, 255.0) as u8;
        Color32::from_rgba_unmultiplied(self.r, self.g, self.b, alpha)
    }

    /// Text color that stays legible on top of this color.
    ///
    /// Blends the color over `backdrop` by its opacity and picks dark text for
    /// light results.
    pub fn text_contrast(&self, backdrop: [u8; 3]) -> Color32 {
        let blend = |c: u8, bg: u8| c as f64 * self.a + bg as f64 * (1.0 - self.a);
        let r = blend(self.r, backdrop[0]);
        let g = blend(self.g, backdrop[1]);
        let b = blend(self.b, backdrop[2]);
        let luma = 0.299 * r + 0.587 * g + 0.114 * b;
        if luma > 140.0 {
            Color32::from_gray(30)
        } else {
            Color32::WHITE
        }
    }
}

/// Map `value` within `[min, max]` to a heatmap color with the given opacity.
///
/// The value is normalized without clamping, so values outside the range push
/// past the gradient ends; the resulting channels are clamped into [0, 255].
pub fn color_for(value: f64, min: f64, max: f64, opacity: f64) -> HeatColor {
    let a = if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        FALLBACK_OPACITY
    };

    if min == max {
        let [r, g, b] = NEUTRAL_GRAY;
        return HeatColor { r, g, b, a };
    }

    let t = (value - min) / (max - min);
    let (r, g, b) = if t < 0.5 {
        let fade = channel(255.0 * t * 2.0);
        (255, fade, fade)
    } else {
        let fade = channel(255.0 * (1.0 - (t - 0.5) * 2.0));
        (fade, 255, fade)
    };

    HeatColor { r, g, b, a }
}

/// Round and clamp a channel value
fn channel(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_range_is_neutral_gray() {
        for v in [-100.0, 0.0, 5.0, 42.0] {
            let c = color_for(v, 5.0, 5.0, 0.7);
            assert_eq!(c.rgb(), NEUTRAL_GRAY, "value {} should map to gray", v);
            assert_eq!(c.a, 0.7);
        }
    }

    #[test]
    fn test_gradient_endpoints() {
        let low = color_for(-10.0, -10.0, 10.0, 1.0);
        assert_eq!(low.rgb(), [255, 0, 0]);

        let mid = color_for(0.0, -10.0, 10.0, 1.0);
        assert_eq!(mid.rgb(), [255, 255, 255]);

        let high = color_for(10.0, -10.0, 10.0, 1.0);
        assert_eq!(high.rgb(), [0, 255, 0]);
    }

    #[test]
    fn test_gradient_quarter_points() {
        // t = 0.25 -> halfway from red to white
        let c = color_for(-5.0, -10.0, 10.0, 0.5);
        assert_eq!(c.rgb(), [255, 128, 128]);

        // t = 0.75 -> halfway from white to green
        let c = color_for(5.0, -10.0, 10.0, 0.5);
        assert_eq!(c.rgb(), [128, 255, 128]);
    }

    #[test]
    fn test_out_of_range_values_clamp_channels() {
        let below = color_for(-30.0, -10.0, 10.0, 1.0);
        assert_eq!(below.rgb(), [255, 0, 0]);

        let above = color_for(30.0, -10.0, 10.0, 1.0);
        assert_eq!(above.rgb(), [0, 255, 0]);
    }

    #[test]
    fn test_opacity_is_clamped() {
        assert_eq!(color_for(0.0, -1.0, 1.0, 1.5).a, 1.0);
        assert_eq!(color_for(0.0, -1.0, 1.0, -0.5).a, 0.0);
        assert_eq!(color_for(0.0, -1.0, 1.0, f64::NAN).a, FALLBACK_OPACITY);
    }

    #[test]
    fn test_deterministic() {
        let a = color_for(3.3, -7.0, 12.0, 0.4);
        let b = color_for(3.3, -7.0, 12.0, 0.4);
        assert_eq!(a, b);
    }

    #[test]
    fn test_to_css() {
        let c = color_for(10.0, -10.0, 10.0, 0.5);
        assert_eq!(c.to_css(), "rgba(0, 255, 0, 0.5)");
    }

    #[test]
    fn test_to_color32_alpha() {
        let c = HeatColor { r: 255, g: 0, b: 0, a: 1.0 };
        assert_eq!(c.to_color32(), Color32::from_rgba_unmultiplied(255, 0, 0, 255));
    }

    #[test]
    fn test_text_contrast() {
        let white = HeatColor { r: 255, g: 255, b: 255, a: 1.0 };
        assert_eq!(white.text_contrast([0, 0, 0]), Color32::from_gray(30));

        let red = HeatColor { r: 255, g: 0, b: 0, a: 1.0 };
        assert_eq!(red.text_contrast([255, 255, 255]), Color32::WHITE);

        // Fully transparent color shows the backdrop
        let clear = HeatColor { r: 255, g: 0, b: 0, a: 0.0 };
        assert_eq!(clear.text_contrast([20, 20, 20]), Color32::WHITE);
    }
}
