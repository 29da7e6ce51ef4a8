use super::{Rect, Vec2};

/// Region of the window, in physical pixels (top-left origin), that shows the
/// game view.
///
/// The render target has a fixed resolution and aspect ratio; the viewport is
/// the largest rectangle of that aspect ratio that fits in the window, centered
/// with bars on the remaining sides.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Largest `aspect` (width / height) rectangle centered in a window of the given size.
    pub fn letterbox(window_width: u32, window_height: u32, aspect: f32) -> Self {
        let window_w = window_width as f32;
        let window_h = window_height as f32;
        if window_w <= 0.0 || window_h <= 0.0 || !aspect.is_finite() || aspect <= 0.0 {
            return Self::default();
        }

        let mut width = window_w;
        let mut height = width / aspect;
        if height > window_h {
            height = window_h;
            width = height * aspect;
        }

        // Whole pixels, so the blit viewport and pointer mapping agree exactly.
        let width = width.round().min(window_w);
        let height = height.round().min(window_h);
        Self {
            x: ((window_w - width) * 0.5).round(),
            y: ((window_h - height) * 0.5).round(),
            width,
            height,
        }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    #[inline]
    pub fn rect(self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Maps a window-pixel position to a texel of a `target_width x target_height`
    /// render target (top-left origin).
    ///
    /// Returns `None` when the position falls on the bars or outside the window.
    pub fn window_to_target(self, p: Vec2, target_width: u32, target_height: u32) -> Option<(u32, u32)> {
        if !self.is_valid() || !self.rect().contains(p) {
            return None;
        }
        let u = (p.x - self.x) / self.width;
        let v = (p.y - self.y) / self.height;
        let tx = ((u * target_width as f32) as u32).min(target_width.saturating_sub(1));
        let ty = ((v * target_height as f32) as u32).min(target_height.saturating_sub(1));
        Some((tx, ty))
    }

    /// Maps a normalized target coordinate (`0..1`, top-left origin) back to window pixels.
    #[inline]
    pub fn target_to_window(self, uv: Vec2) -> Vec2 {
        Vec2::new(self.x + uv.x * self.width, self.y + uv.y * self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDE: f32 = 16.0 / 9.0;

    // ── letterbox ─────────────────────────────────────────────────────────

    #[test]
    fn letterbox_exact_aspect_fills_window() {
        let vp = Viewport::letterbox(1920, 1080, WIDE);
        assert_eq!(vp, Viewport::new(0.0, 0.0, 1920.0, 1080.0));
    }

    #[test]
    fn letterbox_tall_window_gets_horizontal_bars() {
        let vp = Viewport::letterbox(1600, 1200, WIDE);
        assert_eq!(vp.width, 1600.0);
        assert_eq!(vp.height, 900.0);
        assert_eq!(vp.x, 0.0);
        assert_eq!(vp.y, 150.0);
    }

    #[test]
    fn letterbox_wide_window_gets_vertical_bars() {
        let vp = Viewport::letterbox(2000, 900, WIDE);
        assert_eq!(vp.height, 900.0);
        assert_eq!(vp.width, 1600.0);
        assert_eq!(vp.x, 200.0);
        assert_eq!(vp.y, 0.0);
    }

    #[test]
    fn letterbox_minimized_window_is_invalid() {
        assert!(!Viewport::letterbox(0, 0, WIDE).is_valid());
    }

    // ── window_to_target ──────────────────────────────────────────────────

    #[test]
    fn pointer_maps_through_scale() {
        let vp = Viewport::letterbox(1920, 1080, WIDE);
        let texel = vp.window_to_target(Vec2::new(960.0, 540.0), 3840, 2160);
        assert_eq!(texel, Some((1920, 1080)));
    }

    #[test]
    fn pointer_maps_through_offset() {
        let vp = Viewport::letterbox(1600, 1200, WIDE);
        assert_eq!(vp.window_to_target(Vec2::new(0.0, 150.0), 3840, 2160), Some((0, 0)));
    }

    #[test]
    fn pointer_on_bar_resolves_to_none() {
        let vp = Viewport::letterbox(1600, 1200, WIDE);
        assert_eq!(vp.window_to_target(Vec2::new(800.0, 100.0), 3840, 2160), None);
        assert_eq!(vp.window_to_target(Vec2::new(800.0, 1100.0), 3840, 2160), None);
    }

    #[test]
    fn last_pixel_stays_inside_target() {
        let vp = Viewport::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(vp.window_to_target(Vec2::new(99.99, 99.99), 10, 10), Some((9, 9)));
    }

    #[test]
    fn target_to_window_inverts_mapping() {
        let vp = Viewport::letterbox(1600, 1200, WIDE);
        assert_eq!(vp.target_to_window(Vec2::new(0.5, 0.5)), Vec2::new(800.0, 600.0));
    }
}
