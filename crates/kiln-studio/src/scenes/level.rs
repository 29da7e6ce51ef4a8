use anyhow::Result;

use kiln_engine::assets::{ResourceCache, Sprite};
use kiln_engine::coords::Vec2;
use kiln_engine::event::{Event, EventKind};
use kiln_engine::input::Key;
use kiln_engine::object::{
    Animation, Behavior, Capability, ComponentCtx, GameCamera, SpriteRenderer, StateMachine, Transform,
};
use kiln_engine::scene::{Scene, SceneInitializer};

use super::{BLOCKS_SHEET, CHARACTER_SHEET, ITEMS_SHEET, load_shared_resources, refresh_textures, sheet_sprite};

const TILE: f32 = 32.0;
const GROUND_BLOCKS: usize = 60;

const IDLE: &str = "idle";
const RUN: &str = "run";
const START_RUNNING: &str = "startRunning";
const STOP_RUNNING: &str = "stopRunning";

/// Playable level: a ground strip, a player and a camera following it.
pub struct LevelInitializer;

impl LevelInitializer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LevelInitializer {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneInitializer for LevelInitializer {
    fn name(&self) -> &str {
        "Level"
    }

    fn load_resources(&mut self, scene: &mut Scene, cache: &mut ResourceCache) -> Result<()> {
        load_shared_resources(cache);
        refresh_textures(scene, cache);
        Ok(())
    }

    fn init(&mut self, scene: &mut Scene, cache: &mut ResourceCache) -> Result<()> {
        let ground = sheet_sprite(cache, BLOCKS_SHEET, 0);
        for i in 0..GROUND_BLOCKS {
            let block = scene
                .create_game_object(format!("Ground {i}"))
                .with_transform(Transform::new(Vec2::new(i as f32 * TILE, 0.0), Vec2::splat(TILE)))
                .with_component(SpriteRenderer::new().with_sprite(ground.clone()));
            scene.add_game_object(block);
        }

        let idle = sheet_sprite(cache, CHARACTER_SHEET, 0);
        let run = [0, 2, 3, 2].map(|i| sheet_sprite(cache, CHARACTER_SHEET, i));
        let mut running = Animation::new(RUN).looping(true);
        for sprite in run {
            running = running.with_frame(sprite, 0.23);
        }
        let machine = StateMachine::new()
            .with_state(Animation::new(IDLE).with_frame(idle.clone(), 0.1))
            .with_state(running)
            .with_transition(IDLE, START_RUNNING, RUN)
            .with_transition(RUN, STOP_RUNNING, IDLE);

        let player = scene
            .create_game_object("Player")
            .with_transform(Transform::new(Vec2::new(4.0 * TILE, TILE), Vec2::splat(TILE)).with_z_index(1))
            .with_component(SpriteRenderer::new().with_sprite(idle))
            .with_component(machine)
            .with_component(Box::new(PlayerController::new(sheet_sprite(cache, ITEMS_SHEET, 32))));
        let player = scene.add_game_object(player);

        let camera = scene
            .create_game_object("Game Camera")
            .with_component(GameCamera::following(player));
        scene.add_game_object(camera);
        Ok(())
    }
}

/// Arrow keys walk, Space throws a fireball, Escape returns to the editor.
struct PlayerController {
    speed: f32,
    running: bool,
    fireball: Sprite,
}

impl PlayerController {
    const CAPABILITY: Capability = Capability::new("player_controller");

    fn new(fireball: Sprite) -> Self {
        Self {
            speed: 160.0,
            running: false,
            fireball,
        }
    }

    fn throw_fireball(&self, facing: f32, ctx: &mut ComponentCtx<'_>) {
        let origin = ctx.transform.position + Vec2::new(facing * TILE, TILE * 0.25);
        let fireball = ctx
            .create_game_object("Fireball")
            .with_transform(Transform::new(origin, Vec2::splat(TILE * 0.5)).with_z_index(1))
            .with_component(SpriteRenderer::new().with_sprite(self.fireball.clone()))
            .with_component(Box::new(Projectile::new(Vec2::new(facing * 320.0, 0.0))));
        ctx.spawn(fireball);
    }
}

impl Behavior for PlayerController {
    fn capability(&self) -> Capability {
        Self::CAPABILITY
    }

    fn update(&mut self, dt: f32, ctx: &mut ComponentCtx<'_>) {
        if ctx.input_frame.key_pressed(Key::Escape) {
            ctx.post(Event::new(EventKind::GameEngineStopPlay));
            return;
        }

        let mut dir = 0.0;
        if ctx.input.key_down(Key::ArrowLeft) {
            dir -= 1.0;
        }
        if ctx.input.key_down(Key::ArrowRight) {
            dir += 1.0;
        }
        ctx.transform.position.x += dir * self.speed * dt;

        let running = dir != 0.0;
        if running != self.running {
            self.running = running;
            let trigger = if running { START_RUNNING } else { STOP_RUNNING };
            if let Some(machine) = ctx.siblings.get_mut::<StateMachine>() {
                machine.trigger(trigger);
            }
        }

        if ctx.input_frame.key_pressed(Key::Space) {
            let facing = if dir < 0.0 { -1.0 } else { 1.0 };
            self.throw_fireball(facing, ctx);
        }
    }
}

/// Moves at a fixed velocity and destroys its object once `lifetime` runs out.
struct Projectile {
    velocity: Vec2,
    lifetime: f32,
}

impl Projectile {
    const CAPABILITY: Capability = Capability::new("projectile");

    fn new(velocity: Vec2) -> Self {
        Self { velocity, lifetime: 2.0 }
    }
}

impl Behavior for Projectile {
    fn capability(&self) -> Capability {
        Self::CAPABILITY
    }

    fn update(&mut self, dt: f32, ctx: &mut ComponentCtx<'_>) {
        ctx.transform.position += self.velocity * dt;
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            ctx.destroy();
        }
    }
}
