//! The draw-style record: the attributes consulted by every drawing call.
//!
//! This is an explicit, single-owner value threaded through tessellation —
//! never ambient global state. Drawing calls snapshot it at invocation
//! time, so changing an attribute afterwards does not retroactively
//! restyle geometry that was already emitted.

use crate::color::{self, Color};

/// Identifier of a loaded font. `FontId::BUILTIN` is the embedded
/// ASCII-only fallback font that is always available.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub usize);

impl FontId {
    pub const BUILTIN: FontId = FontId(0);
}

/// Default text height in logical units when none is given.
pub const DEFAULT_TEXT_HEIGHT: f32 = 20.0;

/// Current stroke/fill/background colors, line thickness, active font and
/// blend-vertex colors.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawStyle {
    /// Color of lines and shape outlines.
    pub stroke: Color,
    /// Interior color of triangles, rectangles and circles.
    pub fill: Color,
    /// Color the window is filled with on `clear`.
    pub background: Color,
    /// Color of the inactive border region that appears when the window
    /// aspect ratio differs from the logical one.
    pub inactive: Color,
    /// Outline thickness in logical units. Zero means no outline.
    pub thickness: f32,
    /// Font used by text calls.
    pub font: FontId,
    /// Per-vertex colors for the blend variants of triangle/rectangle.
    pub blend: [Color; 4],
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            stroke: color::BLACK,
            fill: color::TRANSPARENT,
            background: color::WHITE,
            inactive: color::DARK_GRAY,
            thickness: 1.0,
            font: FontId::BUILTIN,
            blend: [color::BLACK; 4],
        }
    }
}

impl DrawStyle {
    /// Resets all attributes except the background and inactive colors.
    pub fn reset(&mut self) {
        let keep_background = self.background;
        let keep_inactive = self.inactive;
        *self = Self::default();
        self.background = keep_background;
        self.inactive = keep_inactive;
    }

    pub fn set_stroke(&mut self, c: Color) {
        self.stroke = c.clamped();
    }

    pub fn set_fill(&mut self, c: Color) {
        self.fill = c.clamped();
    }

    pub fn set_background(&mut self, c: Color) {
        self.background = c.clamped();
    }

    pub fn set_inactive(&mut self, c: Color) {
        self.inactive = c.clamped();
    }

    /// Sets the outline thickness. Negative values are rejected: the call
    /// is logged and the previous thickness is kept.
    pub fn set_thickness(&mut self, thickness: f32) {
        if !thickness.is_finite() || thickness < 0.0 {
            log::error!("set_thickness({thickness}): thickness must be >= 0, keeping {}", self.thickness);
            return;
        }
        self.thickness = thickness;
    }

    /// Sets one of the four blend-vertex colors. Indexes above 3 are
    /// rejected with a logged error.
    pub fn set_blend(&mut self, vertex_idx: usize, c: Color) {
        let Some(slot) = self.blend.get_mut(vertex_idx) else {
            log::error!("set_blend({vertex_idx}): vertex index must be 0..=3");
            return;
        };
        *slot = c.clamped();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;

    #[test]
    fn setters_clamp_channels() {
        let mut style = DrawStyle::default();
        style.set_stroke(Color::new(2.0, -1.0, 0.5, 1.5));
        assert_eq!(style.stroke, Color::new(1.0, 0.0, 0.5, 1.0));
    }

    #[test]
    fn negative_thickness_leaves_state_unchanged() {
        let mut style = DrawStyle::default();
        style.set_thickness(4.0);
        style.set_thickness(-1.0);
        assert_eq!(style.thickness, 4.0);
    }

    #[test]
    fn nan_thickness_is_rejected() {
        let mut style = DrawStyle::default();
        style.set_thickness(f32::NAN);
        assert_eq!(style.thickness, 1.0);
    }

    #[test]
    fn out_of_range_blend_index_is_ignored() {
        let mut style = DrawStyle::default();
        style.set_blend(4, color::RED);
        assert_eq!(style.blend, [color::BLACK; 4]);
    }

    #[test]
    fn reset_keeps_background_and_inactive() {
        let mut style = DrawStyle::default();
        style.set_background(color::CYAN);
        style.set_inactive(color::ORANGE);
        style.set_thickness(9.0);
        style.reset();
        assert_eq!(style.background, color::CYAN);
        assert_eq!(style.inactive, color::ORANGE);
        assert_eq!(style.thickness, 1.0);
    }
}
