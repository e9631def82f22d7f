/// RGB color for drawing operations.
///
/// Each component is in the range 0.0 (none) to 1.0 (full intensity).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

    /// Create a color from RGB components (each 0.0–1.0).
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    /// Create a grayscale color (r = g = b = level).
    pub fn gray(level: f64) -> Self {
        Color {
            r: level,
            g: level,
            b: level,
        }
    }

    /// Create a color from hue, saturation and brightness, each
    /// 0.0–1.0. A hue of 1.0 wraps around to red.
    pub fn hsb(hue: f64, saturation: f64, brightness: f64) -> Self {
        let h = (hue.rem_euclid(1.0)) * 6.0;
        let sector = h.floor();
        let f = h - sector;
        let v = brightness;
        let p = v * (1.0 - saturation);
        let q = v * (1.0 - saturation * f);
        let t = v * (1.0 - saturation * (1.0 - f));
        let (r, g, b) = match sector as u8 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Color { r, g, b }
    }
}

/// Dash pattern for stroked paths, in the surface's units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineStyle {
    Solid,
    Dashed { on: f64, off: f64 },
}

/// How a path outline is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    pub line_style: LineStyle,
}

impl StrokeStyle {
    pub fn solid(color: Color, width: f64) -> Self {
        StrokeStyle {
            color,
            width,
            line_style: LineStyle::Solid,
        }
    }

    /// Dashes twice as long as the line is wide.
    pub fn dashed(color: Color, width: f64) -> Self {
        StrokeStyle {
            color,
            width,
            line_style: LineStyle::Dashed {
                on: width * 2.0,
                off: width * 2.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 1e-9
            && (a.g - b.g).abs() < 1e-9
            && (a.b - b.b).abs() < 1e-9
    }

    #[test]
    fn hsb_primaries() {
        assert!(close(Color::hsb(0.0, 1.0, 1.0), Color::rgb(1.0, 0.0, 0.0)));
        assert!(close(
            Color::hsb(1.0 / 3.0, 1.0, 1.0),
            Color::rgb(0.0, 1.0, 0.0)
        ));
        assert!(close(
            Color::hsb(2.0 / 3.0, 1.0, 1.0),
            Color::rgb(0.0, 0.0, 1.0)
        ));
    }

    #[test]
    fn hsb_zero_saturation_is_gray() {
        assert!(close(Color::hsb(0.4, 0.0, 0.3), Color::gray(0.3)));
    }

    #[test]
    fn hsb_teal_accent() {
        let c = Color::hsb(178.0 / 360.0, 1.0, 0.4);
        assert!((c.r - 0.0).abs() < 1e-9);
        assert!((c.g - 0.4).abs() < 1e-9);
        assert!((c.b - 0.4 * (1.0 - 2.0 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn dashed_pattern_scales_with_width() {
        let s = StrokeStyle::dashed(Color::BLACK, 0.5);
        assert_eq!(
            s.line_style,
            LineStyle::Dashed { on: 1.0, off: 1.0 }
        );
    }
}
