use crate::coords::{Rect, Vec2};

/// Placement of a game object in world units.
///
/// `position` is the bottom-left corner of the object's footprint and `scale`
/// its size; rotation (degrees) turns the footprint about its center.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub scale: Vec2,
    pub rotation: f32,
    pub z_index: i32,
}

impl Transform {
    pub fn new(position: Vec2, scale: Vec2) -> Self {
        Self { position, scale, rotation: 0.0, z_index: 0 }
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Unrotated footprint.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec2::zero(), Vec2::splat(32.0))
    }
}
