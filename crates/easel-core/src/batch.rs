//! Batch cache: capture once, replay many times.
//!
//! A batch is a sealed [`DrawBuffer`] captured between an explicit
//! begin/end bracket. While a capture is open, drawing calls append to the
//! pending buffer instead of the live frame. Replay translates vertices at
//! draw time and never re-runs tessellation, so drawing a cached batch
//! costs only the vertex copy — the whole point of the mechanism.
//!
//! The cache hands out [`BatchId`] handles; the string-named convenience
//! surface lives in the windowed `Canvas` layer on top of these.

use crate::coords::Vec2;
use crate::mesh::DrawBuffer;

/// Handle to a batch slot. Obtained from [`BatchCache::begin`] and valid
/// for the lifetime of the cache.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BatchId(usize);

#[derive(Debug)]
struct OpenCapture {
    id: BatchId,
    buffer: DrawBuffer,
}

/// Store of sealed batches plus at most one open capture.
///
/// Misuse of the bracket protocol (nested begin, end without begin,
/// replay of an unsealed slot) is logged and ignored; the program
/// continues.
#[derive(Debug, Default)]
pub struct BatchCache {
    sealed: Vec<Option<DrawBuffer>>,
    open: Option<OpenCapture>,
}

impl BatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a capture, allocating a fresh slot.
    ///
    /// Fails (logs, returns `None`) if a capture is already open; the
    /// cache is left exactly as it was.
    pub fn begin(&mut self) -> Option<BatchId> {
        self.begin_into(None)
    }

    /// Opens a capture that will seal into an existing slot, replacing its
    /// previous contents. `None` allocates a fresh slot. The slot keeps its
    /// old sealed contents (and stays replayable) until `end` runs.
    pub fn begin_into(&mut self, reuse: Option<BatchId>) -> Option<BatchId> {
        if self.open.is_some() {
            log::error!("begin_batch: a batch capture is already open; ignoring");
            return None;
        }

        let id = match reuse {
            Some(id) if id.0 < self.sealed.len() => id,
            Some(id) => {
                log::error!("begin_batch: unknown batch id {id:?}; ignoring");
                return None;
            }
            None => {
                self.sealed.push(None);
                BatchId(self.sealed.len() - 1)
            }
        };

        self.open = Some(OpenCapture { id, buffer: DrawBuffer::new() });
        Some(id)
    }

    /// Seals the open capture and returns its id.
    ///
    /// Fails (logs, returns `None`) if no capture is open.
    pub fn end(&mut self) -> Option<BatchId> {
        let Some(capture) = self.open.take() else {
            log::error!("end_batch: no batch capture is open; ignoring");
            return None;
        };
        let id = capture.id;
        self.sealed[id.0] = Some(capture.buffer);
        Some(id)
    }

    /// True while a capture is open (drawing calls are being redirected).
    #[inline]
    pub fn capturing(&self) -> bool {
        self.open.is_some()
    }

    /// The pending buffer of the open capture, if any. Drawing calls
    /// append here instead of the live frame while a capture is open.
    #[inline]
    pub fn capture_buffer(&mut self) -> Option<&mut DrawBuffer> {
        self.open.as_mut().map(|c| &mut c.buffer)
    }

    /// The sealed buffer for `id`, or `None` if it was never sealed.
    #[inline]
    pub fn get(&self, id: BatchId) -> Option<&DrawBuffer> {
        self.sealed.get(id.0).and_then(|slot| slot.as_ref())
    }

    /// Replays batch `id` into `frame`, translated by `offset`.
    ///
    /// Fails (logs, draws nothing) if the batch was never sealed. The
    /// stored batch is never mutated; the same id can be replayed at
    /// different offsets within one frame.
    pub fn replay(&self, id: BatchId, frame: &mut DrawBuffer, offset: Vec2) -> bool {
        let Some(batch) = self.get(id) else {
            log::error!("draw_batch: batch {id:?} was never sealed; ignoring");
            return false;
        };
        frame.append_translated(batch, offset);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;
    use crate::coords::{Rect, Vec2};
    use crate::style::DrawStyle;
    use crate::tessellate;

    fn scene(buf: &mut DrawBuffer) {
        let mut style = DrawStyle::default();
        style.set_fill(color::YELLOW);
        style.set_thickness(3.0);
        tessellate::circle(buf, Vec2::new(100.0, 100.0), 40.0, &style);
        style.set_fill(color::TRANSPARENT);
        style.set_stroke(color::RED);
        tessellate::rectangle(buf, Rect::new(10.0, 20.0, 50.0, 30.0), &style);
    }

    // ── capture equivalence ──────────────────────────────────────────────

    #[test]
    fn captured_batch_equals_live_tessellation() {
        let mut live = DrawBuffer::new();
        scene(&mut live);

        let mut cache = BatchCache::new();
        let id = cache.begin().unwrap();
        scene(cache.capture_buffer().unwrap());
        assert_eq!(cache.end(), Some(id));

        let mut frame = DrawBuffer::new();
        assert!(cache.replay(id, &mut frame, Vec2::zero()));
        assert_eq!(frame.vertices(), live.vertices());
        assert_eq!(frame.runs(), live.runs());
    }

    #[test]
    fn replay_with_offset_translates_every_triangle() {
        let mut cache = BatchCache::new();
        let id = cache.begin().unwrap();
        scene(cache.capture_buffer().unwrap());
        cache.end();

        let mut zero = DrawBuffer::new();
        let mut moved = DrawBuffer::new();
        cache.replay(id, &mut zero, Vec2::zero());
        cache.replay(id, &mut moved, Vec2::new(7.0, -3.0));

        for (a, b) in moved.vertices().iter().zip(zero.vertices()) {
            assert_eq!(a.pos, b.pos + Vec2::new(7.0, -3.0));
            assert_eq!(a.color, b.color);
        }
    }

    #[test]
    fn replay_twice_does_not_mutate_the_batch() {
        let mut cache = BatchCache::new();
        let id = cache.begin().unwrap();
        scene(cache.capture_buffer().unwrap());
        cache.end();

        let before = cache.get(id).unwrap().clone();
        let mut frame = DrawBuffer::new();
        cache.replay(id, &mut frame, Vec2::new(1.0, 2.0));
        cache.replay(id, &mut frame, Vec2::new(-4.0, 8.0));
        assert_eq!(cache.get(id).unwrap().vertices(), before.vertices());
    }

    // ── protocol misuse ──────────────────────────────────────────────────

    #[test]
    fn nested_begin_is_rejected_and_cache_unchanged() {
        let mut cache = BatchCache::new();
        let first = cache.begin().unwrap();
        scene(cache.capture_buffer().unwrap());

        assert_eq!(cache.begin(), None);

        // The open capture survives and seals into the first id.
        assert_eq!(cache.end(), Some(first));
        assert!(cache.get(first).is_some());
    }

    #[test]
    fn end_without_begin_is_a_no_op() {
        let mut cache = BatchCache::new();
        assert_eq!(cache.end(), None);
    }

    #[test]
    fn replay_of_unsealed_batch_draws_nothing() {
        let mut cache = BatchCache::new();
        let id = cache.begin().unwrap();
        // never sealed: capture still open, slot empty
        let open_id = id;
        cache.capture_buffer(); // still capturing
        let mut frame = DrawBuffer::new();
        assert!(!cache.replay(open_id, &mut frame, Vec2::zero()));
        assert!(frame.is_empty());
    }

    // ── slot reuse ───────────────────────────────────────────────────────

    #[test]
    fn begin_into_replaces_contents_only_at_seal() {
        let mut cache = BatchCache::new();
        let id = cache.begin().unwrap();
        scene(cache.capture_buffer().unwrap());
        cache.end();
        let old_len = cache.get(id).unwrap().vertices().len();

        // Re-capture into the same slot; until `end`, the old geometry
        // stays replayable.
        cache.begin_into(Some(id)).unwrap();
        assert_eq!(cache.get(id).unwrap().vertices().len(), old_len);

        let mut style = DrawStyle::default();
        style.set_fill(color::BLUE);
        style.set_thickness(0.0);
        tessellate::rectangle(
            cache.capture_buffer().unwrap(),
            Rect::new(0.0, 0.0, 1.0, 1.0),
            &style,
        );
        cache.end();
        assert_eq!(cache.get(id).unwrap().triangle_count(), 2);
    }

    #[test]
    fn begin_into_unknown_id_is_rejected() {
        let mut cache = BatchCache::new();
        assert_eq!(cache.begin_into(Some(BatchId(5))), None);
        assert!(!cache.capturing());
    }
}
