use anyhow::Result;

use kiln_engine::assets::{ResourceCache, Sprite};
use kiln_engine::coords::{Rect, Vec2};
use kiln_engine::draw::{SpriteCmd, ZIndex};
use kiln_engine::engine::OverlayFrame;
use kiln_engine::input::Key;
use kiln_engine::object::{Behavior, Capability, ComponentCtx, SpriteRenderer, Transform};
use kiln_engine::paint::Color;
use kiln_engine::scene::{Scene, SceneInitializer, SceneMode};

use super::{BLOCKS_SHEET, load_shared_resources, refresh_textures, sheet_sprite};

const GRID: f32 = 32.0;
const GROUND_BLOCKS: usize = 40;
const PALETTE_SIZE: usize = 12;
const PALETTE_CELL: f32 = 40.0;

/// Editing scene: a ground strip to look at and a camera driven by the keyboard.
pub struct LevelEditorInitializer {
    palette: Vec<Sprite>,
}

impl LevelEditorInitializer {
    pub fn new() -> Self {
        Self { palette: Vec::new() }
    }
}

impl Default for LevelEditorInitializer {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneInitializer for LevelEditorInitializer {
    fn name(&self) -> &str {
        "Level Editor"
    }

    fn mode(&self) -> SceneMode {
        SceneMode::Editor
    }

    fn load_resources(&mut self, scene: &mut Scene, cache: &mut ResourceCache) -> Result<()> {
        load_shared_resources(cache);
        refresh_textures(scene, cache);
        Ok(())
    }

    fn init(&mut self, scene: &mut Scene, cache: &mut ResourceCache) -> Result<()> {
        self.palette = (0..PALETTE_SIZE)
            .map(|i| sheet_sprite(cache, BLOCKS_SHEET, i))
            .collect();

        let camera = scene
            .create_game_object("Editor Camera")
            .with_component(Box::new(EditorCamera::new()));
        scene.add_game_object(camera);

        let ground = sheet_sprite(cache, BLOCKS_SHEET, 0);
        for i in 0..GROUND_BLOCKS {
            let block = scene
                .create_game_object(format!("Ground {i}"))
                .with_transform(Transform::new(Vec2::new(i as f32 * GRID, 0.0), Vec2::splat(GRID)))
                .with_component(
                    SpriteRenderer::new()
                        .with_sprite(ground.clone())
                        .with_color(Color::from_srgb_u8(120, 80, 40, 255)),
                );
            scene.add_game_object(block);
        }
        Ok(())
    }

    /// Block palette along the top edge of the window.
    fn imgui(&self, _scene: &Scene, ui: &mut OverlayFrame<'_>) {
        let tint = Color::WHITE;
        for (i, sprite) in self.palette.iter().enumerate() {
            let cell = Rect::new(8.0 + i as f32 * PALETTE_CELL, 8.0, GRID, GRID);
            ui.draw_list.push_solid_rect(ZIndex(10), cell.inflate(2.0), Color::BLACK);
            ui.draw_list
                .push_sprite(ZIndex(11), SpriteCmd::from_sprite(None, cell, 0.0, sprite, tint));
        }
    }

    fn save(&mut self, scene: &Scene) -> Result<()> {
        log::info!("level editor saved ({} objects)", scene.game_objects().len());
        Ok(())
    }
}

/// Keyboard pan and wheel zoom for the editor view.
struct EditorCamera {
    speed: f32,
    zoom_step: f32,
}

impl EditorCamera {
    const CAPABILITY: Capability = Capability::new("editor_camera");

    fn new() -> Self {
        Self {
            speed: 400.0,
            zoom_step: 0.1,
        }
    }
}

impl Behavior for EditorCamera {
    fn capability(&self) -> Capability {
        Self::CAPABILITY
    }

    fn editor_update(&mut self, dt: f32, ctx: &mut ComponentCtx<'_>) {
        let mut dir = Vec2::zero();
        if ctx.input.key_down(Key::ArrowLeft) {
            dir.x -= 1.0;
        }
        if ctx.input.key_down(Key::ArrowRight) {
            dir.x += 1.0;
        }
        if ctx.input.key_down(Key::ArrowDown) {
            dir.y -= 1.0;
        }
        if ctx.input.key_down(Key::ArrowUp) {
            dir.y += 1.0;
        }
        let step = self.speed * ctx.camera.zoom() * dt;
        ctx.camera.position += dir * step;

        let scroll = ctx.input_frame.scroll_lines;
        if scroll != 0.0 {
            let zoom = ctx.camera.zoom() * (1.0 - self.zoom_step * scroll);
            ctx.camera.set_zoom(zoom);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use kiln_engine::event::EventChannel;
    use kiln_engine::input::{InputEvent, InputFrame, InputState, KeyState, Modifiers};
    use kiln_engine::scene::SceneManager;

    fn editor() -> (SceneManager, ResourceCache) {
        let mut manager = SceneManager::new(EventChannel::new());
        manager.register(|| Box::new(LevelEditorInitializer::new()));
        let mut cache = ResourceCache::new();
        manager.switch_to(0, &mut cache);
        (manager, cache)
    }

    #[test]
    fn builds_camera_and_ground_in_editor_mode() {
        let (manager, _cache) = editor();
        let scene = manager.scene().unwrap();
        assert_eq!(scene.mode(), SceneMode::Editor);
        assert_eq!(scene.game_objects().len(), GROUND_BLOCKS + 1);
        assert_eq!(scene.game_objects()[0].name(), "Editor Camera");
    }

    #[test]
    fn arrow_keys_pan_the_camera() {
        let (mut manager, _cache) = editor();
        let scene = manager.scene_mut().unwrap();

        let mut input = InputState::default();
        let mut frame = InputFrame::default();
        input.apply_event(
            &mut frame,
            InputEvent::Key {
                key: Key::ArrowRight,
                state: KeyState::Pressed,
                modifiers: Modifiers::default(),
                code: 0,
                repeat: false,
            },
        );

        let before = scene.camera().position;
        scene.tick(0.5, &input, &frame);
        assert!(scene.camera().position.x > before.x);
        assert_eq!(scene.camera().position.y, before.y);
    }

    #[test]
    fn wheel_zooms_in() {
        let (mut manager, _cache) = editor();
        let scene = manager.scene_mut().unwrap();
        let frame = InputFrame {
            scroll_lines: 1.0,
            ..InputFrame::default()
        };
        scene.tick(0.016, &InputState::default(), &frame);
        assert!(scene.camera().zoom() < 1.0);
    }
}
