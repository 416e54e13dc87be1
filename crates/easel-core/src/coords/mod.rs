//! Coordinate and geometry types.
//!
//! Canonical drawing space:
//! - Logical coordinates, fixed at window creation
//! - Origin top-left
//! - +X right, +Y down
//!
//! The renderer converts logical coordinates to device pixels through a
//! [`Viewport`], which is a pure function of the logical space and the
//! current physical window size.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::{LogicalSpace, Viewport};
