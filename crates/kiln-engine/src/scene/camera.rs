use crate::coords::{Rect, Vec2};

/// Orthographic 2D camera.
///
/// `position` is the world coordinate shown at the bottom-left corner of the
/// view; the view spans `projection_size * zoom` world units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec2,
    projection_size: Vec2,
    zoom: f32,
}

impl Camera {
    /// 40 by 21 tiles of 32 world units.
    pub const DEFAULT_PROJECTION: Vec2 = Vec2::new(32.0 * 40.0, 32.0 * 21.0);

    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            projection_size: Self::DEFAULT_PROJECTION,
            zoom: 1.0,
        }
    }

    pub fn with_projection_size(mut self, size: Vec2) -> Self {
        self.projection_size = size;
        self
    }

    #[inline]
    pub fn projection_size(&self) -> Vec2 {
        self.projection_size
    }

    #[inline]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(0.1, 10.0);
    }

    /// World-space size of the visible region.
    #[inline]
    pub fn view_extent(&self) -> Vec2 {
        self.projection_size * self.zoom
    }

    #[inline]
    pub fn view_rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.view_extent())
    }

    /// Normalized view coordinate of a world point: `(0, 0)` top-left,
    /// `(1, 1)` bottom-right.
    pub fn world_to_view_uv(&self, p: Vec2) -> Vec2 {
        let extent = self.view_extent();
        let local = p - self.position;
        Vec2::new(local.x / extent.x, 1.0 - local.y / extent.y)
    }

    /// Inverse of [`world_to_view_uv`](Self::world_to_view_uv).
    pub fn view_uv_to_world(&self, uv: Vec2) -> Vec2 {
        let extent = self.view_extent();
        self.position + Vec2::new(uv.x * extent.x, (1.0 - uv.y) * extent.y)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec2::zero())
    }
}
