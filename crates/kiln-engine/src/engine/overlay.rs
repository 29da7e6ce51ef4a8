use crate::coords::{Rect, Vec2, Viewport};
use crate::draw::DrawList;
use crate::event::{Event, EventChannel};
use crate::input::{InputFrame, InputState};
use crate::object::ObjectId;
use crate::scene::{Camera, Scene};

/// What the overlay sees and draws into for one frame.
///
/// Geometry pushed into `draw_list` is in window pixels (top-left origin)
/// and is drawn over the presented scene.
pub struct OverlayFrame<'a> {
    pub draw_list: &'a mut DrawList,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    /// Object under the last primary-button pick, if any.
    pub selected: Option<ObjectId>,
    pub(crate) window_size: (u32, u32),
    pub(crate) viewport: Viewport,
    pub(crate) events: &'a EventChannel,
}

impl<'a> OverlayFrame<'a> {
    #[inline]
    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    /// Window region showing the scene.
    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Posts an engine event, e.g. a request to start play mode.
    pub fn post(&self, event: Event) {
        self.events.notify(None, &event);
    }

    /// Window-pixel position of a world point seen through `camera`.
    pub fn world_to_window(&self, camera: &Camera, p: Vec2) -> Vec2 {
        self.viewport.target_to_window(camera.world_to_view_uv(p))
    }

    /// Window-pixel bounds of a world rectangle.
    pub fn world_rect_to_window(&self, camera: &Camera, r: Rect) -> Rect {
        let a = self.world_to_window(camera, r.min());
        let b = self.world_to_window(camera, r.max());
        Rect::new(a.x.min(b.x), a.y.min(b.y), (a.x - b.x).abs(), (a.y - b.y).abs())
    }
}

/// Immediate-mode layer drawn after the scene each frame.
///
/// Reads the scene but never changes it; requests go through `OverlayFrame::post`.
pub trait Overlay {
    /// `dt` is `None` until a full frame has elapsed.
    fn update(&mut self, dt: Option<f32>, scene: &Scene, ui: &mut OverlayFrame<'_>);
}

/// Forwards to the scene initializer's own overlay hook and nothing else.
#[derive(Debug, Default)]
pub struct DefaultOverlay;

impl Overlay for DefaultOverlay {
    fn update(&mut self, _dt: Option<f32>, scene: &Scene, ui: &mut OverlayFrame<'_>) {
        scene.imgui(ui);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame<'a>(
        list: &'a mut DrawList,
        input: &'a InputState,
        input_frame: &'a InputFrame,
        events: &'a EventChannel,
    ) -> OverlayFrame<'a> {
        OverlayFrame {
            draw_list: list,
            input,
            input_frame,
            selected: None,
            window_size: (1600, 1200),
            viewport: Viewport::letterbox(1600, 1200, 16.0 / 9.0),
            events,
        }
    }

    #[test]
    fn world_origin_maps_to_viewport_bottom_left() {
        let (mut list, input, input_frame, events) =
            (DrawList::new(), InputState::default(), InputFrame::default(), EventChannel::new());
        let ui = frame(&mut list, &input, &input_frame, &events);
        let cam = Camera::default();
        assert_eq!(ui.world_to_window(&cam, Vec2::zero()), Vec2::new(0.0, 1050.0));
    }

    #[test]
    fn world_rect_maps_to_top_left_rect() {
        let (mut list, input, input_frame, events) =
            (DrawList::new(), InputState::default(), InputFrame::default(), EventChannel::new());
        let ui = frame(&mut list, &input, &input_frame, &events);
        let cam = Camera::default();
        let view = cam.view_rect();
        let r = ui.world_rect_to_window(&cam, view);
        assert!((r.origin.x - 0.0).abs() < 1e-3);
        assert!((r.origin.y - 150.0).abs() < 1e-3);
        assert!((r.size.x - 1600.0).abs() < 1e-3);
        assert!((r.size.y - 900.0).abs() < 1e-3);
    }

    #[test]
    fn post_reaches_channel_listeners() {
        use std::cell::Cell;
        use std::rc::Rc;

        let (mut list, input, input_frame, events) =
            (DrawList::new(), InputState::default(), InputFrame::default(), EventChannel::new());
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        events.subscribe(move |_source: Option<ObjectId>, _event: &Event| s.set(s.get() + 1));

        let ui = frame(&mut list, &input, &input_frame, &events);
        ui.post(Event::user("ping"));
        assert_eq!(seen.get(), 1);
    }
}
