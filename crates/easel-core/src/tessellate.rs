//! Primitive tessellation.
//!
//! Every drawing call becomes a flat list of triangles in logical
//! coordinates, with the style snapshot baked into the vertices. Outlines
//! (lines, rectangle borders, circle rings) are themselves tessellated as
//! thin quads rather than rasterized with native line primitives, keeping
//! the output format uniform for the batch cache and renderer.

use crate::color::Color;
use crate::coords::{Rect, Vec2};
use crate::mesh::{DrawBuffer, TextureKey, Vertex};
use crate::style::DrawStyle;

/// Minimum line width in logical units; a thickness of zero still draws a
/// visible hairline for plain `line` calls.
const HAIRLINE: f32 = 1.0;

const MIN_CIRCLE_SEGMENTS: u32 = 12;
const MAX_CIRCLE_SEGMENTS: u32 = 96;

/// Number of polygon segments used to approximate a circle of radius `r`.
///
/// Grows with `sqrt(r)` so big circles stay round without letting the
/// triangle count grow linearly, and is capped to bound worst-case cost.
/// Monotonically non-decreasing in `r`.
pub fn circle_segments(r: f32) -> u32 {
    let r = r.abs();
    ((3.0 * r.sqrt()).ceil() as u32).clamp(MIN_CIRCLE_SEGMENTS, MAX_CIRCLE_SEGMENTS)
}

/// Two triangles covering `rect`, with per-corner UVs and a single color.
/// Corner order: top-left, top-right, bottom-right, bottom-left.
pub fn quad(rect: Rect, uv_min: [f32; 2], uv_max: [f32; 2], color: Color) -> [Vertex; 6] {
    let r = rect.normalized();
    let tl = Vertex { pos: r.min(), uv: uv_min, color };
    let tr = Vertex { pos: Vec2::new(r.x + r.w, r.y), uv: [uv_max[0], uv_min[1]], color };
    let br = Vertex { pos: r.max(), uv: uv_max, color };
    let bl = Vertex { pos: Vec2::new(r.x, r.y + r.h), uv: [uv_min[0], uv_max[1]], color };
    [tl, tr, br, tl, br, bl]
}

/// Line segment from `a` to `b` as a thin quad of the stroke color.
pub fn line(buf: &mut DrawBuffer, a: Vec2, b: Vec2, style: &DrawStyle) {
    let width = style.thickness.max(HAIRLINE);
    push_line_quad(buf, a, b, width, style.stroke);
}

/// Triangle with optional fill and outline, per the current style.
pub fn triangle(buf: &mut DrawBuffer, p1: Vec2, p2: Vec2, p3: Vec2, style: &DrawStyle) {
    if !style.fill.is_transparent() {
        buf.push(
            None,
            &[
                Vertex::solid(p1, style.fill),
                Vertex::solid(p2, style.fill),
                Vertex::solid(p3, style.fill),
            ],
        );
    }
    if style.thickness > 0.0 {
        push_line_quad(buf, p1, p2, style.thickness, style.stroke);
        push_line_quad(buf, p2, p3, style.thickness, style.stroke);
        push_line_quad(buf, p3, p1, style.thickness, style.stroke);
    }
}

/// Triangle with the blend-vertex colors 0..3 of the style.
pub fn triangle_blend(buf: &mut DrawBuffer, p1: Vec2, p2: Vec2, p3: Vec2, style: &DrawStyle) {
    buf.push(
        None,
        &[
            Vertex::solid(p1, style.blend[0]),
            Vertex::solid(p2, style.blend[1]),
            Vertex::solid(p3, style.blend[2]),
        ],
    );
}

/// Axis-aligned rectangle with optional fill and outline.
pub fn rectangle(buf: &mut DrawBuffer, rect: Rect, style: &DrawStyle) {
    let r = rect.normalized();

    if !style.fill.is_transparent() {
        buf.push(None, &quad(r, crate::mesh::WHITE_UV, crate::mesh::WHITE_UV, style.fill));
    }

    let t = style.thickness;
    if t > 0.0 {
        let h = t * 0.5;
        // Border as four quads centered on the edges; the horizontal quads
        // own the corners so edges never overlap (matters for translucent
        // strokes).
        let top = Rect::new(r.x - h, r.y - h, r.w + t, t);
        let bottom = Rect::new(r.x - h, r.y + r.h - h, r.w + t, t);
        let left = Rect::new(r.x - h, r.y + h, t, r.h - t);
        let right = Rect::new(r.x + r.w - h, r.y + h, t, r.h - t);
        for edge in [top, bottom, left, right] {
            if !edge.is_empty() {
                buf.push(None, &quad(edge, crate::mesh::WHITE_UV, crate::mesh::WHITE_UV, style.stroke));
            }
        }
    }
}

/// Axis-aligned rectangle with the four blend-vertex colors at its
/// corners (top-left, top-right, bottom-right, bottom-left).
pub fn rectangle_blend(buf: &mut DrawBuffer, rect: Rect, style: &DrawStyle) {
    let r = rect.normalized();
    let [c0, c1, c2, c3] = style.blend;
    let tl = Vertex::solid(r.min(), c0);
    let tr = Vertex::solid(Vec2::new(r.x + r.w, r.y), c1);
    let br = Vertex::solid(r.max(), c2);
    let bl = Vertex::solid(Vec2::new(r.x, r.y + r.h), c3);
    buf.push(None, &[tl, tr, br, tl, br, bl]);
}

/// Circle approximated by a polygon with [`circle_segments`] sides:
/// a triangle fan for the fill, a quad ring for the outline.
pub fn circle(buf: &mut DrawBuffer, center: Vec2, r: f32, style: &DrawStyle) {
    if r <= 0.0 {
        return;
    }

    let segments = circle_segments(r);
    let step = std::f32::consts::TAU / segments as f32;
    let point = |i: u32, radius: f32| {
        let angle = step * i as f32;
        center + Vec2::new(angle.cos(), angle.sin()) * radius
    };

    if !style.fill.is_transparent() {
        let mut fan = Vec::with_capacity(segments as usize * 3);
        for i in 0..segments {
            fan.push(Vertex::solid(center, style.fill));
            fan.push(Vertex::solid(point(i, r), style.fill));
            fan.push(Vertex::solid(point(i + 1, r), style.fill));
        }
        buf.push(None, &fan);
    }

    let t = style.thickness;
    if t > 0.0 {
        let outer = r + t * 0.5;
        let inner = (r - t * 0.5).max(0.0);
        let mut ring = Vec::with_capacity(segments as usize * 6);
        for i in 0..segments {
            let o0 = Vertex::solid(point(i, outer), style.stroke);
            let o1 = Vertex::solid(point(i + 1, outer), style.stroke);
            let i0 = Vertex::solid(point(i, inner), style.stroke);
            let i1 = Vertex::solid(point(i + 1, inner), style.stroke);
            ring.extend_from_slice(&[o0, o1, i1, o0, i1, i0]);
        }
        buf.push(None, &ring);
    }
}

/// Textured quad covering `rect`, sampling `uv_min..uv_max` of `texture`.
/// Used for glyphs (`texture = None`, atlas UVs) and images.
pub fn textured_quad(
    buf: &mut DrawBuffer,
    texture: Option<TextureKey>,
    rect: Rect,
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    color: Color,
) {
    buf.push(texture, &quad(rect, uv_min, uv_max, color));
}

fn push_line_quad(buf: &mut DrawBuffer, a: Vec2, b: Vec2, width: f32, color: Color) {
    let n = (b - a).perpendicular_unit() * (width * 0.5);
    if n == Vec2::zero() {
        return; // zero-length segment
    }
    buf.push(
        None,
        &[
            Vertex::solid(a + n, color),
            Vertex::solid(b + n, color),
            Vertex::solid(b - n, color),
            Vertex::solid(a + n, color),
            Vertex::solid(b - n, color),
            Vertex::solid(a - n, color),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;

    fn style() -> DrawStyle {
        DrawStyle::default()
    }

    // ── circle segment policy ────────────────────────────────────────────

    #[test]
    fn circle_segments_monotonically_non_decreasing() {
        let mut prev = 0;
        for r in 0..2000 {
            let s = circle_segments(r as f32);
            assert!(s >= prev, "segments dropped at r={r}");
            prev = s;
        }
    }

    #[test]
    fn circle_segments_bounded() {
        assert_eq!(circle_segments(0.0), MIN_CIRCLE_SEGMENTS);
        assert_eq!(circle_segments(1.0e9), MAX_CIRCLE_SEGMENTS);
    }

    #[test]
    fn circle_triangle_count_monotonic_and_capped() {
        let mut prev = 0;
        for r in [1.0, 10.0, 50.0, 100.0, 1000.0, 1.0e6] {
            let mut buf = DrawBuffer::new();
            let mut s = style();
            s.set_fill(color::RED);
            s.set_thickness(2.0);
            circle(&mut buf, Vec2::zero(), r, &s);
            let count = buf.triangle_count();
            assert!(count >= prev);
            // fan + ring, both capped by the segment maximum
            assert!(count <= 3 * MAX_CIRCLE_SEGMENTS as usize);
            prev = count;
        }
    }

    // ── fill/outline gating ──────────────────────────────────────────────

    #[test]
    fn transparent_fill_emits_no_fill_geometry() {
        let mut buf = DrawBuffer::new();
        let mut s = style();
        s.set_fill(color::TRANSPARENT);
        s.set_thickness(0.0);
        circle(&mut buf, Vec2::zero(), 50.0, &s);
        triangle(&mut buf, Vec2::zero(), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), &s);
        rectangle(&mut buf, Rect::new(0.0, 0.0, 5.0, 5.0), &s);
        assert!(buf.is_empty());
    }

    #[test]
    fn outline_only_circle_is_a_quad_ring() {
        let mut buf = DrawBuffer::new();
        let mut s = style();
        s.set_fill(color::TRANSPARENT);
        s.set_thickness(10.0);
        circle(&mut buf, Vec2::new(100.0, 100.0), 100.0, &s);
        assert_eq!(buf.triangle_count(), 2 * circle_segments(100.0) as usize);
    }

    #[test]
    fn line_uses_hairline_for_zero_thickness() {
        let mut buf = DrawBuffer::new();
        let mut s = style();
        s.set_thickness(0.0);
        line(&mut buf, Vec2::zero(), Vec2::new(10.0, 0.0), &s);
        assert_eq!(buf.triangle_count(), 2);
        // quad extends HAIRLINE/2 on each side of the segment
        let ys: Vec<f32> = buf.vertices().iter().map(|v| v.pos.y).collect();
        assert!(ys.iter().any(|&y| (y - 0.5).abs() < 1e-6));
        assert!(ys.iter().any(|&y| (y + 0.5).abs() < 1e-6));
    }

    #[test]
    fn zero_length_line_emits_nothing() {
        let mut buf = DrawBuffer::new();
        line(&mut buf, Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0), &style());
        assert!(buf.is_empty());
    }

    // ── blend variants ───────────────────────────────────────────────────

    #[test]
    fn rectangle_blend_assigns_corner_colors() {
        let mut buf = DrawBuffer::new();
        let mut s = style();
        s.set_blend(0, color::RED);
        s.set_blend(1, color::GREEN);
        s.set_blend(2, color::BLUE);
        s.set_blend(3, color::WHITE);
        rectangle_blend(&mut buf, Rect::new(0.0, 0.0, 10.0, 10.0), &s);

        let at = |x: f32, y: f32| {
            buf.vertices()
                .iter()
                .find(|v| v.pos == Vec2::new(x, y))
                .map(|v| v.color)
        };
        assert_eq!(at(0.0, 0.0), Some(color::RED));
        assert_eq!(at(10.0, 0.0), Some(color::GREEN));
        assert_eq!(at(10.0, 10.0), Some(color::BLUE));
        assert_eq!(at(0.0, 10.0), Some(color::WHITE));
    }

    // ── snapshot semantics ───────────────────────────────────────────────

    #[test]
    fn later_style_changes_do_not_recolor_recorded_geometry() {
        let mut buf = DrawBuffer::new();
        let mut s = style();
        s.set_fill(color::RED);
        s.set_thickness(0.0);
        triangle(&mut buf, Vec2::zero(), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), &s);

        s.set_fill(color::BLUE);
        assert!(buf.vertices().iter().all(|v| v.color == color::RED));
    }
}
