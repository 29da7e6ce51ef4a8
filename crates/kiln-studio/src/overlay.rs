use kiln_engine::draw::ZIndex;
use kiln_engine::engine::{Overlay, OverlayFrame};
use kiln_engine::event::{Event, EventKind};
use kiln_engine::input::Key;
use kiln_engine::paint::Color;
use kiln_engine::scene::Scene;

const SELECTION_Z: ZIndex = ZIndex(100);

/// Studio chrome drawn over the scene: scene widgets, the selection outline
/// and the play/save hotkeys.
pub struct EditorOverlay {
    outline: Color,
    thickness: f32,
}

impl EditorOverlay {
    pub fn new() -> Self {
        Self {
            outline: Color::from_srgb_u8(255, 170, 0, 255),
            thickness: 2.0,
        }
    }

    /// Hotkey mapped to an engine request, if any was pressed this frame.
    fn hotkey(ui: &OverlayFrame<'_>) -> Option<EventKind> {
        let pressed = |key| ui.input_frame.key_pressed(key);
        if ui.input.modifiers.ctrl && pressed(Key::S) {
            Some(EventKind::SaveLevel)
        } else if pressed(Key::F5) {
            Some(EventKind::GameEngineStartPlay)
        } else if pressed(Key::F6) {
            Some(EventKind::GameEngineStopPlay)
        } else if pressed(Key::F9) {
            Some(EventKind::LoadLevel)
        } else {
            None
        }
    }
}

impl Default for EditorOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Overlay for EditorOverlay {
    fn update(&mut self, _dt: Option<f32>, scene: &Scene, ui: &mut OverlayFrame<'_>) {
        scene.imgui(ui);

        if let Some(obj) = ui.selected.and_then(|id| scene.game_object(id)) {
            let rect = ui.world_rect_to_window(scene.camera(), obj.bounds());
            ui.draw_list.push_outline(SELECTION_Z, rect, self.thickness, self.outline);
        }

        if let Some(kind) = Self::hotkey(ui) {
            log::debug!("hotkey request: {kind:?}");
            ui.post(Event::new(kind));
        }
    }
}
