use crate::coords::Rect;

use super::TextureHandle;

/// A region of a texture, or a plain colored quad when `texture` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub texture: Option<TextureHandle>,
    /// Normalized texture coordinates, top-left origin.
    pub uv: Rect,
    /// Size of the region in texels (0 for untextured sprites).
    pub width: u32,
    pub height: u32,
}

impl Sprite {
    /// Untextured sprite; renders as the owner's tint color.
    pub fn blank() -> Self {
        Self {
            texture: None,
            uv: Rect::unit(),
            width: 0,
            height: 0,
        }
    }

    /// The whole texture.
    pub fn from_texture(texture: TextureHandle) -> Self {
        Self {
            width: texture.width(),
            height: texture.height(),
            texture: Some(texture),
            uv: Rect::unit(),
        }
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self::blank()
    }
}

/// Texture sliced into equally sized cells.
///
/// Cells are numbered row by row from the top-left corner, skipping
/// `spacing` texels between neighbours.
#[derive(Debug, Clone)]
pub struct Spritesheet {
    texture: TextureHandle,
    sprites: Vec<Sprite>,
}

impl Spritesheet {
    pub fn new(texture: TextureHandle, sprite_width: u32, sprite_height: u32, count: usize, spacing: u32) -> Self {
        let tw = texture.width().max(1) as f32;
        let th = texture.height().max(1) as f32;
        let mut sprites = Vec::with_capacity(count);

        let (mut x, mut y) = (0u32, 0u32);
        for _ in 0..count {
            if y + sprite_height > texture.height() {
                log::warn!(
                    "spritesheet '{}' holds fewer than {count} cells of {sprite_width}x{sprite_height}",
                    texture.path()
                );
                break;
            }

            sprites.push(Sprite {
                texture: Some(texture.clone()),
                uv: Rect::new(
                    x as f32 / tw,
                    y as f32 / th,
                    sprite_width as f32 / tw,
                    sprite_height as f32 / th,
                ),
                width: sprite_width,
                height: sprite_height,
            });

            x += sprite_width + spacing;
            if x + sprite_width > texture.width() {
                x = 0;
                y += sprite_height + spacing;
            }
        }

        Self { texture, sprites }
    }

    #[inline]
    pub fn texture(&self) -> &TextureHandle {
        &self.texture
    }

    #[inline]
    pub fn sprite(&self, index: usize) -> Option<&Sprite> {
        self.sprites.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::assets::TextureId;

    fn texture(width: u32, height: u32) -> TextureHandle {
        TextureHandle { id: TextureId(0), path: Rc::from("sheet.png"), width, height }
    }

    #[test]
    fn cells_run_left_to_right_then_down() {
        let sheet = Spritesheet::new(texture(32, 32), 16, 16, 4, 0);
        assert_eq!(sheet.len(), 4);
        assert_eq!(sheet.sprite(0).unwrap().uv, Rect::new(0.0, 0.0, 0.5, 0.5));
        assert_eq!(sheet.sprite(1).unwrap().uv, Rect::new(0.5, 0.0, 0.5, 0.5));
        assert_eq!(sheet.sprite(2).unwrap().uv, Rect::new(0.0, 0.5, 0.5, 0.5));
    }

    #[test]
    fn spacing_is_skipped_between_cells() {
        let sheet = Spritesheet::new(texture(34, 16), 16, 16, 2, 2);
        assert_eq!(sheet.sprite(1).unwrap().uv.origin.x, 18.0 / 34.0);
    }

    #[test]
    fn count_larger_than_texture_is_truncated() {
        let sheet = Spritesheet::new(texture(16, 16), 16, 16, 3, 0);
        assert_eq!(sheet.len(), 1);
        assert!(sheet.sprite(1).is_none());
    }

    #[test]
    fn sprite_sizes_are_in_texels() {
        let sheet = Spritesheet::new(texture(72, 48), 24, 48, 3, 0);
        let s = sheet.sprite(2).unwrap();
        assert_eq!((s.width, s.height), (24, 48));
    }
}
