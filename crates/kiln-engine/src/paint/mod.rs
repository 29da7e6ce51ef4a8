//! Paint model shared between scenes and renderers.
//!
//! Colors are linear premultiplied alpha, matching the blend state used by the
//! color pass (`ONE, ONE_MINUS_SRC_ALPHA`).

pub mod color;

pub use color::Color;
