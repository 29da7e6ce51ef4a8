use crate::assets::{Sprite, TextureHandle};
use crate::coords::{Rect, Vec2};
use crate::object::ObjectId;
use crate::paint::Color;

use super::{DrawList, ZIndex};

/// One textured (or plain) quad.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteCmd {
    /// Object written into the pick target; `None` leaves the sentinel.
    pub object: Option<ObjectId>,
    /// Quad bounds before rotation, in view space.
    pub rect: Rect,
    /// Rotation about the quad center, in radians.
    pub rotation: f32,
    /// Premultiplied tint, multiplied with the texel.
    pub color: Color,
    /// `None` draws with a 1x1 white texture.
    pub texture: Option<TextureHandle>,
    /// Normalized texture region, top-left origin.
    pub uv: Rect,
}

impl SpriteCmd {
    pub fn from_sprite(object: Option<ObjectId>, rect: Rect, rotation: f32, sprite: &Sprite, color: Color) -> Self {
        Self {
            object,
            rect,
            rotation,
            color,
            texture: sprite.texture.clone(),
            uv: sprite.uv,
        }
    }

    pub fn solid(rect: Rect, color: Color) -> Self {
        Self {
            object: None,
            rect,
            rotation: 0.0,
            color,
            texture: None,
            uv: Rect::unit(),
        }
    }
}

impl DrawList {
    #[inline]
    pub fn push_sprite(&mut self, z: ZIndex, cmd: SpriteCmd) {
        if !cmd.rect.is_empty() {
            self.push(z, cmd);
        }
    }

    #[inline]
    pub fn push_solid_rect(&mut self, z: ZIndex, rect: Rect, color: Color) {
        self.push_sprite(z, SpriteCmd::solid(rect.normalized(), color));
    }

    /// Four edge quads just inside `rect`.
    pub fn push_outline(&mut self, z: ZIndex, rect: Rect, thickness: f32, color: Color) {
        let r = rect.normalized();
        let t = thickness.min(r.size.x * 0.5).min(r.size.y * 0.5);
        if t <= 0.0 {
            return;
        }
        let Vec2 { x, y } = r.origin;
        let Vec2 { x: w, y: h } = r.size;

        self.push_solid_rect(z, Rect::new(x, y, w, t), color);
        self.push_solid_rect(z, Rect::new(x, y + h - t, w, t), color);
        self.push_solid_rect(z, Rect::new(x, y + t, t, h - 2.0 * t), color);
        self.push_solid_rect(z, Rect::new(x + w - t, y + t, t, h - 2.0 * t), color);
    }
}
