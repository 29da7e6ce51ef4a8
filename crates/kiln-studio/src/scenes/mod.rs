//! The two scenes the studio ships: the level editor and the playable level.

mod level;
mod level_editor;

pub use level::LevelInitializer;
pub use level_editor::LevelEditorInitializer;

use kiln_engine::assets::{ResourceCache, Sprite, Spritesheet};
use kiln_engine::object::{SpriteRenderer, StateMachine};
use kiln_engine::scene::Scene;

pub const BLOCKS_SHEET: &str = "assets/images/spritesheets/decorationsAndBlocks.png";
pub const CHARACTER_SHEET: &str = "assets/images/spritesheet.png";
pub const ITEMS_SHEET: &str = "assets/images/items.png";
pub const GIZMOS_SHEET: &str = "assets/images/gizmos.png";

/// (path, sprite width, sprite height, sprite count)
const SHEETS: [(&str, u32, u32, usize); 4] = [
    (BLOCKS_SHEET, 16, 16, 81),
    (CHARACTER_SHEET, 16, 16, 26),
    (ITEMS_SHEET, 16, 16, 43),
    (GIZMOS_SHEET, 24, 48, 3),
];

const MAIN_THEME: &str = "assets/sounds/main-theme-overworld.ogg";

const EFFECTS: [&str; 14] = [
    "assets/sounds/flagpole.ogg",
    "assets/sounds/break_block.ogg",
    "assets/sounds/bump.ogg",
    "assets/sounds/coin.ogg",
    "assets/sounds/gameover.ogg",
    "assets/sounds/jump-small.ogg",
    "assets/sounds/mario_die.ogg",
    "assets/sounds/pipe.ogg",
    "assets/sounds/powerup.ogg",
    "assets/sounds/powerup_appears.ogg",
    "assets/sounds/stage_clear.ogg",
    "assets/sounds/stomp.ogg",
    "assets/sounds/kick.ogg",
    "assets/sounds/invincible.ogg",
];

/// Registers every spritesheet and sound both scenes rely on.
///
/// A sheet whose image cannot be read is skipped with a warning; objects
/// that ask for it fall back to blank sprites.
pub fn load_shared_resources(cache: &mut ResourceCache) {
    for (path, width, height, count) in SHEETS {
        match cache.texture(path) {
            Ok(texture) => cache.add_spritesheet(path, Spritesheet::new(texture, width, height, count, 0)),
            Err(e) => log::warn!("{e:#}"),
        }
    }

    cache.add_sound(MAIN_THEME, true);
    for path in EFFECTS {
        cache.add_sound(path, false);
    }
}

/// Points every renderer and animation in `scene` back at the cached textures.
pub fn refresh_textures(scene: &mut Scene, cache: &mut ResourceCache) {
    let ids: Vec<_> = scene.game_objects().iter().map(|o| o.id()).collect();
    for id in ids {
        let Some(obj) = scene.game_object_mut(id) else { continue };
        if let Some(renderer) = obj.get_mut::<SpriteRenderer>() {
            renderer.refresh_texture(cache);
        }
        if let Some(machine) = obj.get_mut::<StateMachine>() {
            machine.refresh_textures(cache);
        }
    }
}

/// Sprite `index` of the sheet at `path`, or a blank sprite.
pub fn sheet_sprite(cache: &ResourceCache, path: &str, index: usize) -> Sprite {
    cache
        .spritesheet(path)
        .and_then(|sheet| sheet.sprite(index))
        .cloned()
        .unwrap_or_default()
}
