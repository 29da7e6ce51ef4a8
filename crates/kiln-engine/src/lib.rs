//! Kiln engine crate.
//!
//! Runtime core of the 2D engine: window and GPU plumbing, the frame
//! orchestrator, scenes, game objects and the components attached to them.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod paint;
pub mod draw;
pub mod render;

pub mod assets;
pub mod event;
pub mod object;
pub mod scene;
pub mod engine;
