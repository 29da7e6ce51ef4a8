//! Built-in component variants.

mod game_camera;
mod sprite_renderer;
mod state_machine;

pub use game_camera::GameCamera;
pub use sprite_renderer::SpriteRenderer;
pub use state_machine::{Animation, AnimationFrame, StateMachine};
