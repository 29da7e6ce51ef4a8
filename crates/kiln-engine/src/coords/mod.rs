//! Coordinate and geometry types shared across the engine.
//!
//! Two spaces are in use:
//! - world units: origin bottom-left, +Y up (scene content, cameras)
//! - window pixels: physical pixels, origin top-left, +Y down (pointer, overlay)
//!
//! Renderers convert to NDC in shaders using a view uniform.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
