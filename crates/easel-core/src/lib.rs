//! Window-free core of the easel drawing library.
//!
//! Everything in this crate is pure CPU work: coordinate mapping,
//! tessellation of primitives into triangle lists, the draw-style record,
//! and the batch cache. The windowed `easel` crate layers winit/wgpu on
//! top; nothing here depends on a live window, which keeps the whole core
//! testable from plain unit tests.

pub mod batch;
pub mod color;
pub mod coords;
pub mod mesh;
pub mod style;
pub mod tessellate;

pub use batch::{BatchCache, BatchId};
pub use color::Color;
pub use coords::{LogicalSpace, Rect, Vec2, Viewport};
pub use mesh::{DrawBuffer, Run, TextureKey, Vertex, WHITE_UV};
pub use style::{DrawStyle, FontId, DEFAULT_TEXT_HEIGHT};
