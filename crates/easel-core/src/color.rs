//! Straight-alpha RGBA color and the named teaching palette.
//!
//! Channels are `f32` in `[0, 1]`. The renderer premultiplies in the
//! fragment shader, so CPU-side geometry always carries straight alpha.

/// Straight-alpha RGBA color, channels in `[0, 1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color from RGB components.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Clamps all channels to `[0, 1]`.
    #[inline]
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    #[inline]
    pub fn is_transparent(self) -> bool {
        self.a <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

// Named color presets matching the original teaching palette.
pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
pub const MAGENTA: Color = Color::rgb(1.0, 0.0, 1.0);
pub const CYAN: Color = Color::rgb(0.0, 1.0, 1.0);
pub const DARK_RED: Color = Color::rgb(0.5, 0.0, 0.0);
pub const DARK_GREEN: Color = Color::rgb(0.0, 0.5, 0.0);
pub const DARK_BLUE: Color = Color::rgb(0.0, 0.0, 0.5);
pub const ORANGE: Color = Color::rgb(1.0, 0.65, 0.0);
pub const BROWN: Color = Color::rgb(0.55, 0.27, 0.07);
pub const PURPLE: Color = Color::rgb(0.5, 0.0, 0.5);
pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);
pub const DARK_GRAY: Color = Color::rgb(0.25, 0.25, 0.25);
pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

/// The sixteen opaque palette entries, indexable for demo scenes.
pub const PALETTE: [Color; 16] = [
    BLACK, WHITE, RED, GREEN, BLUE, YELLOW, MAGENTA, CYAN, DARK_RED, DARK_GREEN, DARK_BLUE,
    ORANGE, BROWN, PURPLE, GRAY, DARK_GRAY,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_limits_out_of_range_channels() {
        let c = Color::new(1.5, -0.25, 0.5, 2.0).clamped();
        assert_eq!(c, Color::new(1.0, 0.0, 0.5, 1.0));
    }

    #[test]
    fn transparent_palette_entry() {
        assert!(TRANSPARENT.is_transparent());
        assert!(!BLACK.is_transparent());
    }
}
