//! easel — a small immediate-mode 2D drawing library for teaching.
//!
//! Opens a window, exposes primitive shape/text/image drawing calls,
//! polls keyboard/mouse state, and drives a frame loop. All drawing uses
//! a logical coordinate system fixed at window creation; resizing the
//! window scales the picture uniformly and never distorts it.
//!
//! ```no_run
//! use easel::{Canvas, WindowConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut canvas = Canvas::open(WindowConfig::new("hello", 800.0, 600.0))?;
//!     canvas.circle(400.0, 300.0, 150.0);
//!     canvas.wait_until_closed();
//!     Ok(())
//! }
//! ```

mod canvas;
mod driver;
mod gpu;
mod images;
mod logging;
mod pacer;
mod render;
mod text;

pub mod input;

pub use canvas::{Canvas, WindowConfig};
pub use easel_core::color;
pub use easel_core::{Color, FontId};
pub use images::AssetError;
pub use input::{Input, Key, MouseButton, WaitResult};
pub use logging::{init_logging, LoggingConfig};
