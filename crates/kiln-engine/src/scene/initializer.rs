use anyhow::Result;

use crate::assets::ResourceCache;
use crate::engine::OverlayFrame;

use super::{Scene, SceneMode};

/// Level-specific setup strategy for a `Scene`.
pub trait SceneInitializer {
    /// Name used in logs and window titles.
    fn name(&self) -> &str;

    /// Which component hook the scene drives each frame.
    fn mode(&self) -> SceneMode {
        SceneMode::Play
    }

    /// Declares the resources the scene needs (textures, spritesheets, sounds).
    ///
    /// Runs before `init` and before any render.
    fn load_resources(&mut self, scene: &mut Scene, cache: &mut ResourceCache) -> Result<()>;

    /// Populates the scene with its game objects.
    fn init(&mut self, scene: &mut Scene, cache: &mut ResourceCache) -> Result<()>;

    /// Scene-specific overlay affordances; must not change the scene.
    fn imgui(&self, _scene: &Scene, _ui: &mut OverlayFrame<'_>) {}

    /// Persists mutable scene state. Storage format is up to the scene.
    fn save(&mut self, _scene: &Scene) -> Result<()> {
        Ok(())
    }
}
