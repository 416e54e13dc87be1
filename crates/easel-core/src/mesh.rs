//! The uniform triangle stream every drawing call produces.
//!
//! All primitives — filled shapes, outlines, glyphs, images — tessellate
//! into the same vertex format (position, UV, straight-alpha color) so the
//! batch cache and the renderer only ever deal with one kind of geometry.
//! Vertices are grouped into [`Run`]s: a run is a contiguous span of
//! triangles drawn with one texture (or the glyph/shape atlas when
//! `texture` is `None`), preserving the order of the original calls.

use crate::color::Color;
use crate::coords::Vec2;

/// UV of the solid-white atlas pixel used by untextured geometry.
pub const WHITE_UV: [f32; 2] = [0.0, 0.0];

/// Opaque identifier of a texture owned by the renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureKey(pub u64);

/// One triangle-list vertex in logical coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vertex {
    pub pos: Vec2,
    pub uv: [f32; 2],
    pub color: Color,
}

impl Vertex {
    #[inline]
    pub const fn solid(pos: Vec2, color: Color) -> Self {
        Self { pos, uv: WHITE_UV, color }
    }
}

/// A contiguous vertex span drawn with a single texture binding.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Run {
    /// `None` draws from the shape/glyph atlas; `Some` from an image texture.
    pub texture: Option<TextureKey>,
    pub start: u32,
    pub count: u32,
}

/// Recorded triangle stream: the live retained scene and every sealed
/// batch are both `DrawBuffer`s.
///
/// `push` calls are O(1); `clear` keeps allocated capacity for reuse.
#[derive(Debug, Default, Clone)]
pub struct DrawBuffer {
    vertices: Vec<Vertex>,
    runs: Vec<Run>,
}

impl DrawBuffer {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Clears recorded geometry, keeping capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.runs.clear();
    }

    /// Truncates the buffer back to `mark` vertices.
    ///
    /// Used by transient overlays (interactive text entry) that draw, show
    /// a frame, and then remove their geometry again.
    pub fn truncate(&mut self, mark: usize) {
        self.vertices.truncate(mark);
        while let Some(last) = self.runs.last_mut() {
            let start = last.start as usize;
            if start >= mark {
                self.runs.pop();
            } else {
                last.count = (mark - start) as u32;
                break;
            }
        }
    }

    /// Appends vertices for `texture`, extending the current run when the
    /// binding matches so consecutive same-texture calls coalesce.
    pub fn push(&mut self, texture: Option<TextureKey>, vertices: &[Vertex]) {
        debug_assert!(vertices.len() % 3 == 0, "triangle list expected");
        if vertices.is_empty() {
            return;
        }

        let start = self.vertices.len() as u32;
        let count = vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);

        match self.runs.last_mut() {
            Some(run) if run.texture == texture && run.start + run.count == start => {
                run.count += count;
            }
            _ => self.runs.push(Run { texture, start, count }),
        }
    }

    /// Appends all of `other`, translated by `offset` in logical space.
    ///
    /// This is batch replay: `other` is never mutated, so the same buffer
    /// can be replayed at different offsets within one frame.
    pub fn append_translated(&mut self, other: &DrawBuffer, offset: Vec2) {
        for run in &other.runs {
            let span = &other.vertices[run.start as usize..(run.start + run.count) as usize];
            let start = self.vertices.len() as u32;
            self.vertices.extend(span.iter().map(|v| Vertex {
                pos: v.pos + offset,
                uv: v.uv,
                color: v.color,
            }));

            match self.runs.last_mut() {
                Some(last) if last.texture == run.texture && last.start + last.count == start => {
                    last.count += run.count;
                }
                _ => self.runs.push(Run { texture: run.texture, start, count: run.count }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;

    fn tri(x: f32) -> [Vertex; 3] {
        [
            Vertex::solid(Vec2::new(x, 0.0), color::RED),
            Vertex::solid(Vec2::new(x + 1.0, 0.0), color::RED),
            Vertex::solid(Vec2::new(x, 1.0), color::RED),
        ]
    }

    // ── runs ──────────────────────────────────────────────────────────────

    #[test]
    fn consecutive_atlas_pushes_coalesce_into_one_run() {
        let mut buf = DrawBuffer::new();
        buf.push(None, &tri(0.0));
        buf.push(None, &tri(5.0));
        assert_eq!(buf.runs().len(), 1);
        assert_eq!(buf.runs()[0].count, 6);
    }

    #[test]
    fn texture_change_starts_a_new_run() {
        let mut buf = DrawBuffer::new();
        buf.push(None, &tri(0.0));
        buf.push(Some(TextureKey(7)), &tri(5.0));
        buf.push(None, &tri(9.0));
        let textures: Vec<_> = buf.runs().iter().map(|r| r.texture).collect();
        assert_eq!(textures, vec![None, Some(TextureKey(7)), None]);
    }

    // ── append_translated ────────────────────────────────────────────────

    #[test]
    fn append_translated_offsets_positions_only() {
        let mut batch = DrawBuffer::new();
        batch.push(None, &tri(0.0));

        let mut frame = DrawBuffer::new();
        frame.append_translated(&batch, Vec2::new(10.0, 20.0));

        for (a, b) in frame.vertices().iter().zip(batch.vertices()) {
            assert_eq!(a.pos, b.pos + Vec2::new(10.0, 20.0));
            assert_eq!(a.color, b.color);
            assert_eq!(a.uv, b.uv);
        }
    }

    #[test]
    fn replay_does_not_mutate_the_source_buffer() {
        let mut batch = DrawBuffer::new();
        batch.push(None, &tri(0.0));
        let snapshot = batch.clone();

        let mut frame = DrawBuffer::new();
        frame.append_translated(&batch, Vec2::new(3.0, 0.0));
        frame.append_translated(&batch, Vec2::new(-8.0, 4.0));

        assert_eq!(batch.vertices(), snapshot.vertices());
        assert_eq!(batch.runs(), snapshot.runs());
    }

    // ── truncate ──────────────────────────────────────────────────────────

    #[test]
    fn truncate_rolls_back_vertices_and_runs() {
        let mut buf = DrawBuffer::new();
        buf.push(None, &tri(0.0));
        let mark = buf.vertices().len();
        buf.push(Some(TextureKey(1)), &tri(2.0));
        buf.push(None, &tri(4.0));

        buf.truncate(mark);
        assert_eq!(buf.vertices().len(), mark);
        assert_eq!(buf.runs().len(), 1);
        assert_eq!(buf.runs()[0].count, 3);
    }

    #[test]
    fn truncate_mid_run_shortens_it() {
        let mut buf = DrawBuffer::new();
        buf.push(None, &tri(0.0));
        buf.push(None, &tri(2.0));
        buf.truncate(3);
        assert_eq!(buf.runs()[0].count, 3);
    }
}
