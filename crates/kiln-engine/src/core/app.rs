use anyhow::Result;
use winit::event::WindowEvent;

use super::ctx::{FrameCtx, InitCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called once, after the window and GPU exist and before the first frame.
    ///
    /// An error here is fatal: the runtime shuts down and returns it.
    fn on_init(&mut self, ctx: &mut InitCtx<'_, '_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called for window events.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called exactly once when the loop stops, while the GPU is still alive.
    fn on_exit(&mut self) {}
}
