//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single Window, and wires them to the
//! GPU layer and the input queue.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
