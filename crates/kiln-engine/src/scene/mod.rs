//! Scene state machine.
//!
//! A `Scene` owns the active level's game objects and camera and walks the
//! fixed lifecycle `load → init → start → {update, render}* → save_exit`.
//! Level-specific logic lives in a `SceneInitializer`; the `SceneManager`
//! builds scenes from a closed, indexed set of initializer factories.

mod camera;
mod initializer;
mod manager;
#[allow(clippy::module_inception)]
mod scene;

pub use camera::Camera;
pub use initializer::SceneInitializer;
pub use manager::{SceneFactory, SceneManager};
pub use scene::{Scene, SceneMode};
