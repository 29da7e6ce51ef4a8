use crate::assets::{ResourceCache, Sprite};
use crate::object::{Behavior, Capability, ComponentKind};
use crate::paint::Color;

/// Makes its object visible: the scene draws one sprite quad over the
/// object's transform for every live object carrying this component.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteRenderer {
    color: Color,
    sprite: Sprite,
}

impl SpriteRenderer {
    pub fn new() -> Self {
        Self {
            color: Color::WHITE,
            sprite: Sprite::blank(),
        }
    }

    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = sprite;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    pub fn set_sprite(&mut self, sprite: Sprite) {
        if self.sprite != sprite {
            self.sprite = sprite;
        }
    }

    /// Re-resolves the sprite's texture by path through `cache`.
    ///
    /// A texture that can no longer be loaded leaves the sprite untextured.
    pub fn refresh_texture(&mut self, cache: &mut ResourceCache) {
        let Some(texture) = self.sprite.texture.as_ref() else { return };
        match cache.texture(texture.path()) {
            Ok(fresh) => self.sprite.texture = Some(fresh),
            Err(e) => {
                log::warn!("sprite texture refresh failed: {e:#}");
                self.sprite.texture = None;
            }
        }
    }
}

impl Default for SpriteRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Behavior for SpriteRenderer {
    fn capability(&self) -> Capability {
        Self::CAPABILITY
    }
}
