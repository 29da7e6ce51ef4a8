use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};

use super::shader::{ShaderHandle, ShaderId};
use super::sound::SoundHandle;
use super::spritesheet::Spritesheet;
use super::texture::{TextureData, TextureHandle, TextureId};

/// Path of the standard color-pass sprite shader.
pub const DEFAULT_SHADER: &str = "assets/shaders/default.wgsl";

/// Path of the picking-pass shader (writes object ids instead of color).
pub const PICKING_SHADER: &str = "assets/shaders/picking.wgsl";

const BUILTIN_SHADERS: [(&str, &str); 2] = [
    (DEFAULT_SHADER, include_str!("shaders/default.wgsl")),
    (PICKING_SHADER, include_str!("shaders/picking.wgsl")),
];

/// Process-lifetime cache of shaders, textures, spritesheets and sounds.
pub struct ResourceCache {
    shaders: HashMap<PathBuf, ShaderHandle>,
    textures: HashMap<PathBuf, TextureHandle>,
    failed_textures: HashMap<PathBuf, String>,
    texture_data: Vec<TextureData>,
    spritesheets: HashMap<PathBuf, Spritesheet>,
    sounds: HashMap<PathBuf, SoundHandle>,
}

impl ResourceCache {
    /// Creates a cache with the built-in shaders registered.
    pub fn new() -> Self {
        let mut cache = Self {
            shaders: HashMap::new(),
            textures: HashMap::new(),
            failed_textures: HashMap::new(),
            texture_data: Vec::new(),
            spritesheets: HashMap::new(),
            sounds: HashMap::new(),
        };
        for (path, source) in BUILTIN_SHADERS {
            cache.insert_shader(path, source);
        }
        cache
    }

    // ── shaders ───────────────────────────────────────────────────────────

    /// Returns the shader registered under `path`, reading WGSL from disk on first use.
    pub fn shader(&mut self, path: impl AsRef<Path>) -> Result<ShaderHandle> {
        let key = cache_key(path.as_ref());
        if let Some(handle) = self.shaders.get(&key) {
            return Ok(handle.clone());
        }

        let source = std::fs::read_to_string(&key)
            .with_context(|| format!("failed to read shader '{}'", key.display()))?;
        log::debug!("loaded shader '{}'", key.display());
        Ok(self.insert_shader(&key, &source))
    }

    /// Registers shader source under `path` unless something is already there.
    pub fn insert_shader(&mut self, path: impl AsRef<Path>, source: &str) -> ShaderHandle {
        let key = cache_key(path.as_ref());
        let id = ShaderId(self.shaders.len() as u32);
        self.shaders
            .entry(key)
            .or_insert_with_key(|key| ShaderHandle {
                id,
                path: Rc::from(key.to_string_lossy().as_ref()),
                source: Rc::from(source),
            })
            .clone()
    }

    // ── textures ──────────────────────────────────────────────────────────

    /// Returns the texture at `path`, decoding the image file on first use.
    ///
    /// A failed decode is remembered; later requests for the same path fail
    /// with the same message without touching the disk.
    pub fn texture(&mut self, path: impl AsRef<Path>) -> Result<TextureHandle> {
        let key = cache_key(path.as_ref());
        if let Some(handle) = self.textures.get(&key) {
            return Ok(handle.clone());
        }
        if let Some(reason) = self.failed_textures.get(&key) {
            return Err(anyhow!("{reason}"));
        }

        match decode_texture(&key) {
            Ok(data) => {
                log::debug!("loaded texture '{}' ({}x{})", key.display(), data.width(), data.height());
                Ok(self.insert_texture(&key, data))
            }
            Err(e) => {
                self.failed_textures.insert(key, format!("{e:#}"));
                Err(e)
            }
        }
    }

    /// Registers already-decoded pixels under `path` unless something is already there.
    pub fn insert_texture(&mut self, path: impl AsRef<Path>, data: TextureData) -> TextureHandle {
        let key = cache_key(path.as_ref());
        if let Some(handle) = self.textures.get(&key) {
            return handle.clone();
        }

        let handle = TextureHandle {
            id: TextureId(self.texture_data.len() as u32),
            path: Rc::from(key.to_string_lossy().as_ref()),
            width: data.width(),
            height: data.height(),
        };
        self.texture_data.push(data);
        self.failed_textures.remove(&key);
        self.textures.insert(key, handle.clone());
        handle
    }

    /// Pixels behind a texture handle, for GPU upload.
    pub fn texture_data(&self, id: TextureId) -> Option<&TextureData> {
        self.texture_data.get(id.0 as usize)
    }

    // ── spritesheets ──────────────────────────────────────────────────────

    /// Registers a spritesheet under `path`; an existing entry is kept.
    pub fn add_spritesheet(&mut self, path: impl AsRef<Path>, sheet: Spritesheet) {
        let key = cache_key(path.as_ref());
        self.spritesheets.entry(key).or_insert(sheet);
    }

    /// `None` when nothing was added under `path`; callers pick their own fallback.
    pub fn spritesheet(&self, path: impl AsRef<Path>) -> Option<&Spritesheet> {
        self.spritesheets.get(&cache_key(path.as_ref()))
    }

    // ── sounds ────────────────────────────────────────────────────────────

    /// Registers a sound clip; the first registration's `looping` flag wins.
    pub fn add_sound(&mut self, path: impl AsRef<Path>, looping: bool) -> SoundHandle {
        let key = cache_key(path.as_ref());
        self.sounds
            .entry(key)
            .or_insert_with_key(|key| SoundHandle {
                path: Rc::from(key.to_string_lossy().as_ref()),
                looping,
            })
            .clone()
    }

    pub fn sound(&self, path: impl AsRef<Path>) -> Option<SoundHandle> {
        self.sounds.get(&cache_key(path.as_ref())).cloned()
    }

    pub fn sounds(&self) -> impl Iterator<Item = &SoundHandle> {
        self.sounds.values()
    }
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_texture(path: &Path) -> Result<TextureData> {
    let image = image::open(path)
        .with_context(|| format!("failed to decode texture '{}'", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    TextureData::from_straight_rgba8(width, height, image.into_raw())
        .with_context(|| format!("invalid texture '{}'", path.display()))
}

/// Lexical normalization so `./a/b.png` and `a/b.png` share an entry.
fn cache_key(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();
        path
    }

    // ── shaders ───────────────────────────────────────────────────────────

    #[test]
    fn builtin_shaders_need_no_disk() {
        let mut cache = ResourceCache::new();
        let default = cache.shader(DEFAULT_SHADER).unwrap();
        let picking = cache.shader(PICKING_SHADER).unwrap();
        assert!(default.source().contains("vs_main"));
        assert_ne!(default.id(), picking.id());
    }

    #[test]
    fn shader_is_read_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.wgsl");
        std::fs::write(&path, "// custom").unwrap();

        let mut cache = ResourceCache::new();
        let first = cache.shader(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = cache.shader(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_shader_is_an_error() {
        let mut cache = ResourceCache::new();
        assert!(cache.shader("does/not/exist.wgsl").is_err());
    }

    // ── textures ──────────────────────────────────────────────────────────

    #[test]
    fn texture_decodes_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "block.png", 4, 2);

        let mut cache = ResourceCache::new();
        let first = cache.texture(&path).unwrap();
        assert_eq!((first.width(), first.height()), (4, 2));

        // Second request must not need the file.
        std::fs::remove_file(&path).unwrap();
        let second = cache.texture(&path).unwrap();
        assert_eq!(first, second);

        let data = cache.texture_data(first.id()).unwrap();
        assert_eq!(&data.pixels()[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn undecodable_texture_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        let mut cache = ResourceCache::new();
        assert!(cache.texture(&path).is_err());
    }

    #[test]
    fn failed_decode_is_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.png");

        let mut cache = ResourceCache::new();
        let first = cache.texture(&path).unwrap_err();

        // A valid file appearing afterwards is not picked up.
        write_png(dir.path(), "late.png", 2, 2);
        let second = cache.texture(&path).unwrap_err();
        assert_eq!(format!("{first:#}"), format!("{second:#}"));
    }

    #[test]
    fn inserting_pixels_clears_a_failed_decode() {
        let mut cache = ResourceCache::new();
        assert!(cache.texture("missing/tile.png").is_err());

        cache.insert_texture("missing/tile.png", TextureData::solid(3, 3, crate::paint::Color::WHITE));
        let handle = cache.texture("missing/tile.png").unwrap();
        assert_eq!((handle.width(), handle.height()), (3, 3));
    }

    #[test]
    fn equivalent_paths_share_an_entry() {
        let mut cache = ResourceCache::new();
        let a = cache.insert_texture("./img/a.png", TextureData::solid(1, 1, crate::paint::Color::WHITE));
        let b = cache.insert_texture("img/a.png", TextureData::solid(2, 2, crate::paint::Color::BLACK));
        assert_eq!(a, b);
        assert_eq!(b.width(), 1);
    }

    // ── spritesheets & sounds ─────────────────────────────────────────────

    #[test]
    fn spritesheet_lookup_by_path() {
        let mut cache = ResourceCache::new();
        let tex = cache.insert_texture("sheet.png", TextureData::solid(32, 16, crate::paint::Color::WHITE));
        cache.add_spritesheet("sheet.png", Spritesheet::new(tex, 16, 16, 2, 0));

        let sheet = cache.spritesheet("sheet.png").unwrap();
        assert_eq!(sheet.sprite(1).unwrap().uv, Rect::new(0.5, 0.0, 0.5, 1.0));
        assert!(cache.spritesheet("other.png").is_none());
    }

    #[test]
    fn sound_registration_is_idempotent() {
        let mut cache = ResourceCache::new();
        let first = cache.add_sound("assets/sounds/theme.ogg", true);
        let second = cache.add_sound("assets/sounds/theme.ogg", false);
        assert_eq!(first, second);
        assert!(second.is_looping());
        assert_eq!(cache.sounds().count(), 1);
        assert_eq!(cache.sound("assets/sounds/theme.ogg"), Some(first));
    }
}
