//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates platform events into `InputEvent`s and buffers them in
//! an `InputQueue`; the engine drains the queue once at the top of each frame.

mod frame;
mod queue;
mod state;
mod types;

pub(crate) mod translate;

pub use frame::InputFrame;
pub use queue::InputQueue;
pub use state::InputState;
pub use types::{
    InputEvent,
    Key,
    KeyState,
    Modifiers,
    MouseButton,
    MouseButtonState,
    MouseWheelDelta,
    PointerButtonEvent,
    PointerMoveEvent,
};
