//! GPU rendering subsystem.
//!
//! Renderers consume `draw` lists and issue GPU commands via wgpu. Each
//! renderer owns its GPU resources (pipelines, buffers, uploaded textures).
//!
//! Convention:
//! - Scene geometry is in world units (bottom-left origin, +Y up).
//! - Overlay geometry is in window pixels (top-left origin, +Y down).
//! - A `ViewUniform` maps either space to NDC in the vertex shader.

mod batch;
mod common;
mod ctx;
mod framebuffer;
mod picking;
mod present;

pub use batch::BatchRenderer;
pub use common::ViewUniform;
pub use ctx::{RenderCtx, RenderTarget};
pub use framebuffer::FrameBuffer;
pub use picking::{PICK_FORMAT, PickingSurface};
pub use present::Presenter;
