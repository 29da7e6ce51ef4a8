//! Engine context and frame orchestration.
//!
//! `EngineContext` is the single engine value: window size, background color,
//! scenes, resources, input and the event channel. `Engine` drives it through
//! one frame per redraw (input, picking pass, color pass, overlay, present)
//! on top of the window runtime. `EngineBuilder` wires scenes and an overlay
//! and runs the loop.

mod config;
mod context;
mod orchestrator;
mod overlay;

pub use config::EngineConfig;
pub use context::EngineContext;
pub use orchestrator::{Engine, EngineBuilder};
pub use overlay::{DefaultOverlay, Overlay, OverlayFrame};
