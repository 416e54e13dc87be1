use super::{Rect, Vec2};

/// The fixed drawing coordinate system established at window creation.
///
/// All drawing calls use these coordinates regardless of the actual pixel
/// size of the window.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LogicalSpace {
    pub width: f32,
    pub height: f32,
}

impl LogicalSpace {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn aspect(self) -> f32 {
        self.width / self.height
    }
}

/// Mapping from logical coordinates onto the largest centered rectangle of
/// the physical window that preserves the logical aspect ratio.
///
/// A `Viewport` is a pure function of `(LogicalSpace, physical size)` and
/// carries no other state; it is recomputed from scratch on every resize.
/// Pixels outside the active rectangle form the inactive region, filled
/// with the inactive-region color before the scene is drawn.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    /// Uniform logical→device scale factor.
    pub scale: f32,
    /// Device-pixel offset of the active rectangle's top-left corner.
    pub offset: Vec2,
    /// Physical window size in device pixels.
    pub physical: Vec2,
}

impl Viewport {
    /// Computes the viewport for `space` inside a `pw` × `ph` pixel window.
    ///
    /// Scale is `min(pw / lw, ph / lh)`; the scaled logical rectangle is
    /// centered, so resizing never distorts shapes, only scales them.
    pub fn fit(space: LogicalSpace, pw: f32, ph: f32) -> Self {
        let pw = pw.max(1.0);
        let ph = ph.max(1.0);
        let scale = (pw / space.width).min(ph / space.height);

        let active_w = space.width * scale;
        let active_h = space.height * scale;

        Self {
            scale,
            offset: Vec2::new((pw - active_w) * 0.5, (ph - active_h) * 0.5),
            physical: Vec2::new(pw, ph),
        }
    }

    /// Maps a logical point to device pixels.
    #[inline]
    pub fn map_to_device(self, p: Vec2) -> Vec2 {
        self.offset + p * self.scale
    }

    /// Maps a device-pixel point back to logical coordinates.
    ///
    /// Inverse of [`map_to_device`](Self::map_to_device); used for mouse
    /// positions, which arrive in device pixels.
    #[inline]
    pub fn map_to_logical(self, p: Vec2) -> Vec2 {
        (p - self.offset) / self.scale
    }

    /// The active drawing rectangle in device pixels.
    #[inline]
    pub fn active_rect(self) -> Rect {
        Rect::new(
            self.offset.x,
            self.offset.y,
            self.physical.x - 2.0 * self.offset.x,
            self.physical.y - 2.0 * self.offset.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPACE: LogicalSpace = LogicalSpace::new(800.0, 450.0);

    // ── fit ───────────────────────────────────────────────────────────────

    #[test]
    fn fit_at_native_size_is_identity() {
        let vp = Viewport::fit(SPACE, 800.0, 450.0);
        assert_eq!(vp.scale, 1.0);
        assert_eq!(vp.offset, Vec2::zero());
    }

    #[test]
    fn fit_wider_window_centers_horizontally() {
        let vp = Viewport::fit(SPACE, 1000.0, 450.0);
        assert_eq!(vp.scale, 1.0);
        assert_eq!(vp.offset, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn fit_taller_window_centers_vertically() {
        let vp = Viewport::fit(SPACE, 800.0, 650.0);
        assert_eq!(vp.scale, 1.0);
        assert_eq!(vp.offset, Vec2::new(0.0, 100.0));
    }

    #[test]
    fn active_rect_preserves_aspect_ratio() {
        for (pw, ph) in [(123.0, 777.0), (1920.0, 1080.0), (450.0, 800.0)] {
            let vp = Viewport::fit(SPACE, pw, ph);
            let active = vp.active_rect();
            let aspect = active.w / active.h;
            assert!(
                (aspect - SPACE.aspect()).abs() < 1e-4,
                "aspect {aspect} for {pw}x{ph}"
            );
        }
    }

    #[test]
    fn mapped_points_stay_inside_active_rect() {
        let corners = [
            Vec2::zero(),
            Vec2::new(800.0, 0.0),
            Vec2::new(0.0, 450.0),
            Vec2::new(800.0, 450.0),
            Vec2::new(400.0, 225.0),
        ];
        for (pw, ph) in [(300.0, 1000.0), (1000.0, 300.0), (801.0, 451.0)] {
            let vp = Viewport::fit(SPACE, pw, ph);
            let active = vp.active_rect();
            for &p in &corners {
                assert!(active.contains(vp.map_to_device(p)), "{p:?} at {pw}x{ph}");
            }
        }
    }

    #[test]
    fn map_to_logical_inverts_map_to_device() {
        let vp = Viewport::fit(SPACE, 1333.0, 999.0);
        let p = Vec2::new(123.0, 45.0);
        let back = vp.map_to_logical(vp.map_to_device(p));
        assert!((back.x - p.x).abs() < 1e-3);
        assert!((back.y - p.y).abs() < 1e-3);
    }

    #[test]
    fn resize_round_trip_reproduces_viewport() {
        let original = Viewport::fit(SPACE, 800.0, 450.0);
        // Resize away and back; fit is pure, so the result must be identical.
        let _wide = Viewport::fit(SPACE, 2400.0, 500.0);
        let _small = Viewport::fit(SPACE, 100.0, 100.0);
        let back = Viewport::fit(SPACE, 800.0, 450.0);
        assert_eq!(original, back);
    }

    #[test]
    fn degenerate_physical_size_does_not_produce_nan() {
        let vp = Viewport::fit(SPACE, 0.0, 0.0);
        assert!(vp.scale.is_finite());
        assert!(vp.offset.is_finite());
    }
}
