//! Frame timing.
//!
//! The engine ticks one `FrameClock` at the end of every frame; the measured
//! duration becomes the delta time handed to the next frame's scene update.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
