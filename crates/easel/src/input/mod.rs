//! Input subsystem.
//!
//! Public types are platform-agnostic and do not expose winit; the driver
//! translates window-system events into them. Two views exist side by
//! side: [`InputState`] answers "is this key down right now?" polls, and
//! [`InputQueue`] holds edge-triggered press events plus committed text
//! for the blocking wait calls.

mod state;
mod types;

pub(crate) mod winit_map;

pub use state::{InputQueue, InputState};
pub use types::{Input, Key, MouseButton, WaitResult};
