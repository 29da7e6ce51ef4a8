use std::cell::RefCell;
use std::rc::Rc;

use crate::assets::ResourceCache;
use crate::coords::Viewport;
use crate::event::{Event, EventChannel, EventKind, ListenerId};
use crate::input::{InputEvent, InputFrame, InputQueue, InputState, MouseButton};
use crate::object::ObjectId;
use crate::paint::Color;
use crate::scene::{Scene, SceneInitializer, SceneManager};
use crate::time::FrameClock;

use super::EngineConfig;

/// Scene-level requests raised through the event channel.
///
/// They are queued while the frame runs and applied in `end_frame`, never
/// in the middle of a pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Request {
    StartPlay,
    StopPlay,
    Save,
    Reload,
}

impl Request {
    fn from_event(event: &Event) -> Option<Self> {
        match event.kind() {
            EventKind::GameEngineStartPlay => Some(Self::StartPlay),
            EventKind::GameEngineStopPlay => Some(Self::StopPlay),
            EventKind::SaveLevel => Some(Self::Save),
            EventKind::LoadLevel => Some(Self::Reload),
            _ => None,
        }
    }
}

/// The engine's state, created once and passed to whatever needs it.
///
/// Holds the window size, background color, scene manager, resource cache,
/// input state and event channel. GPU resources live in the orchestrator.
pub struct EngineContext {
    config: EngineConfig,
    width: u32,
    height: u32,
    background: Color,

    scenes: SceneManager,
    resources: ResourceCache,
    events: EventChannel,

    input: InputState,
    input_frame: InputFrame,
    selection: Option<ObjectId>,

    requests: Rc<RefCell<Vec<Request>>>,
    listener: ListenerId,

    clock: FrameClock,
    dt: Option<f32>,
    started: bool,
    shut_down: bool,
}

impl EngineContext {
    pub fn new(config: EngineConfig) -> Self {
        let events = EventChannel::new();
        let requests: Rc<RefCell<Vec<Request>>> = Rc::default();

        let sink = Rc::clone(&requests);
        let listener = events.subscribe(move |_source: Option<ObjectId>, event: &Event| {
            if let Some(request) = Request::from_event(event) {
                sink.borrow_mut().push(request);
            }
        });

        Self {
            width: 0,
            height: 0,
            background: config.background,
            scenes: SceneManager::new(events.clone()),
            resources: ResourceCache::new(),
            events,
            input: InputState::default(),
            input_frame: InputFrame::default(),
            selection: None,
            requests,
            listener,
            clock: FrameClock::new(),
            dt: None,
            started: false,
            shut_down: false,
            config,
        }
    }

    /// Registers the next scene index.
    pub fn register_scene<F>(&mut self, factory: F) -> usize
    where
        F: Fn() -> Box<dyn SceneInitializer> + 'static,
    {
        self.scenes.register(factory)
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Window size in physical pixels.
    #[inline]
    pub fn window_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn render_size(&self) -> (u32, u32) {
        (self.config.render_width, self.config.render_height)
    }

    #[inline]
    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Window region the frame buffer is presented into.
    pub fn viewport(&self) -> Viewport {
        Viewport::letterbox(self.width, self.height, self.config.aspect)
    }

    /// The active scene; always fully started once `start` has run.
    #[inline]
    pub fn scene(&self) -> Option<&Scene> {
        self.scenes.scene()
    }

    #[inline]
    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scenes.scene_mut()
    }

    #[inline]
    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    #[inline]
    pub fn resources(&self) -> &ResourceCache {
        &self.resources
    }

    #[inline]
    pub fn resources_mut(&mut self) -> &mut ResourceCache {
        &mut self.resources
    }

    #[inline]
    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    #[inline]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    #[inline]
    pub fn input_frame(&self) -> &InputFrame {
        &self.input_frame
    }

    #[inline]
    pub fn selection(&self) -> Option<ObjectId> {
        self.selection
    }

    /// Seconds between the last two frames; `None` before the first full frame.
    #[inline]
    pub fn dt(&self) -> Option<f32> {
        self.dt
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    /// Records the drawable size; called at startup and on resize events.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Switches to scene 0 and starts the frame clock.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.scenes.switch_to(0, &mut self.resources);
        self.dt = None;
        self.clock.reset();
    }

    /// Drains platform input into the input state and posts each event.
    pub fn begin_frame(&mut self, queue: &mut InputQueue) {
        self.input_frame.clear();
        for ev in queue.drain() {
            if let InputEvent::Resized { width, height } = ev {
                self.set_window_size(width, height);
            }
            self.input.apply_event(&mut self.input_frame, ev.clone());
            self.events.notify(None, &Event::input(ev));
        }
    }

    /// Frame-buffer texel under the pointer while the primary button is held.
    ///
    /// `None` when the button is up or the pointer is outside the letterboxed view.
    pub fn pick_target_pixel(&self) -> Option<(u32, u32)> {
        if !self.input.button_down(MouseButton::Left) {
            return None;
        }
        let pointer = self.input.pointer_pos?;
        self.viewport()
            .window_to_target(pointer, self.config.render_width, self.config.render_height)
    }

    /// Resolves a raw picking-surface value to a live object and selects it.
    ///
    /// The sentinel and ids of objects no longer in the scene resolve to `None`.
    pub fn resolve_pick(&mut self, raw: u32) -> Option<ObjectId> {
        let picked = ObjectId::from_pick(raw).filter(|id| {
            self.scene()
                .and_then(|s| s.game_object(*id))
                .is_some_and(|o| !o.is_dead())
        });

        if picked != self.selection {
            log::debug!(
                "pick: {}",
                picked.map_or_else(|| "nothing".to_string(), |id| id.to_string())
            );
            self.selection = picked;
            self.events.notify(None, &Event::object_picked(picked));
        }
        picked
    }

    /// Runs the active scene's per-frame hook, once a delta is known.
    pub fn advance(&mut self) {
        let Some(dt) = self.dt else { return };
        if let Some(scene) = self.scenes.scene_mut() {
            scene.tick(dt, &self.input, &self.input_frame);
        }
    }

    /// Measures the frame delta and applies queued scene requests.
    pub fn end_frame(&mut self) {
        self.dt = Some(self.clock.tick().dt);
        self.apply_requests();
    }

    /// Persists the active scene exactly once.
    ///
    /// A failed save is logged; shutdown continues regardless.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        if let Err(e) = self.scenes.save_current() {
            log::error!("{e:#}");
        }
        self.events.unsubscribe(self.listener);
    }

    #[inline]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    fn apply_requests(&mut self) {
        let requests = std::mem::take(&mut *self.requests.borrow_mut());
        for request in requests {
            match request {
                Request::StartPlay => self.switch_scene(self.config.play_scene, true),
                Request::StopPlay => self.switch_scene(self.config.editor_scene, false),
                Request::Save => {
                    if let Err(e) = self.scenes.save_current() {
                        log::error!("{e:#}");
                    }
                }
                Request::Reload => {
                    if let Some(index) = self.scenes.current_index() {
                        self.switch_scene(index, false);
                    }
                }
            }
        }
    }

    /// Play sessions and reloads throw away the outgoing scene's state;
    /// entering play saves the editor scene first.
    fn switch_scene(&mut self, index: usize, save_outgoing: bool) {
        if index >= self.scenes.len() {
            log::warn!("ignoring switch to unregistered scene {index}");
            return;
        }
        self.selection = None;
        if save_outgoing {
            self.scenes.switch_to(index, &mut self.resources);
        } else {
            self.scenes.switch_discarding(index, &mut self.resources);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use anyhow::Result;

    use super::*;
    use crate::coords::Vec2;
    use crate::input::{MouseButtonState, PointerButtonEvent, PointerMoveEvent};
    use crate::object::{Behavior, Capability, ComponentCtx, SpriteRenderer, Transform};
    use crate::scene::SceneMode;

    struct Counter(Rc<Cell<u32>>);

    impl Behavior for Counter {
        fn capability(&self) -> Capability {
            Capability::new("counter")
        }

        fn update(&mut self, _dt: f32, _ctx: &mut ComponentCtx<'_>) {
            self.0.set(self.0.get() + 1);
        }
    }

    struct TestScene {
        name: &'static str,
        updates: Rc<Cell<u32>>,
        saves: Rc<Cell<u32>>,
    }

    impl SceneInitializer for TestScene {
        fn name(&self) -> &str {
            self.name
        }

        fn mode(&self) -> SceneMode {
            SceneMode::Play
        }

        fn load_resources(&mut self, _scene: &mut Scene, _cache: &mut ResourceCache) -> Result<()> {
            Ok(())
        }

        fn init(&mut self, scene: &mut Scene, _cache: &mut ResourceCache) -> Result<()> {
            let obj = scene
                .create_game_object("thing")
                .with_transform(Transform::new(Vec2::zero(), Vec2::splat(32.0)))
                .with_component(SpriteRenderer::new())
                .with_component(Box::new(Counter(self.updates.clone())));
            scene.add_game_object(obj);
            Ok(())
        }

        fn save(&mut self, _scene: &Scene) -> Result<()> {
            self.saves.set(self.saves.get() + 1);
            Ok(())
        }
    }

    struct Fixture {
        ctx: EngineContext,
        updates: Rc<Cell<u32>>,
        saves: Rc<Cell<u32>>,
    }

    fn fixture() -> Fixture {
        let updates = Rc::new(Cell::new(0));
        let saves = Rc::new(Cell::new(0));
        let mut ctx = EngineContext::new(EngineConfig::default());
        for name in ["editor", "level"] {
            let (u, s) = (updates.clone(), saves.clone());
            ctx.register_scene(move || {
                Box::new(TestScene { name, updates: u.clone(), saves: s.clone() })
            });
        }
        ctx.set_window_size(1920, 1080);
        ctx.start();
        Fixture { ctx, updates, saves }
    }

    fn press_at(queue: &mut InputQueue, x: f32, y: f32) {
        queue.push(InputEvent::PointerMoved(PointerMoveEvent { x, y }));
        queue.push(InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state: MouseButtonState::Pressed,
            x,
            y,
            modifiers: Default::default(),
        }));
    }

    // ── frame timing ──────────────────────────────────────────────────────

    #[test]
    fn first_frame_does_not_update_the_scene() {
        let mut f = fixture();
        assert_eq!(f.ctx.dt(), None);
        f.ctx.advance();
        assert_eq!(f.updates.get(), 0);
    }

    #[test]
    fn later_frames_update_with_a_non_negative_delta() {
        let mut f = fixture();
        f.ctx.advance();
        f.ctx.end_frame();
        let dt = f.ctx.dt().unwrap();
        assert!(dt >= 0.0);

        f.ctx.advance();
        assert_eq!(f.updates.get(), 1);
    }

    // ── input ─────────────────────────────────────────────────────────────

    #[test]
    fn resize_events_update_window_size() {
        let mut f = fixture();
        let mut queue = InputQueue::new(8);
        queue.push(InputEvent::Resized { width: 800, height: 600 });
        f.ctx.begin_frame(&mut queue);
        assert_eq!(f.ctx.window_size(), (800, 600));
        assert!(queue.is_empty());
    }

    #[test]
    fn input_events_are_posted_on_the_channel() {
        let mut f = fixture();
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        f.ctx.events().subscribe(move |_src: Option<ObjectId>, ev: &Event| {
            if ev.kind() == EventKind::Input {
                s.set(s.get() + 1);
            }
        });

        let mut queue = InputQueue::new(8);
        press_at(&mut queue, 10.0, 10.0);
        f.ctx.begin_frame(&mut queue);
        assert_eq!(seen.get(), 2);
        assert!(f.ctx.input_frame().button_pressed(MouseButton::Left));
    }

    // ── picking ───────────────────────────────────────────────────────────

    #[test]
    fn no_pick_without_primary_button() {
        let f = fixture();
        assert_eq!(f.ctx.pick_target_pixel(), None);
    }

    #[test]
    fn pointer_maps_into_render_resolution() {
        let mut f = fixture();
        let mut queue = InputQueue::new(8);
        press_at(&mut queue, 960.0, 540.0);
        f.ctx.begin_frame(&mut queue);
        assert_eq!(f.ctx.pick_target_pixel(), Some((1920, 1080)));
    }

    #[test]
    fn pointer_on_letterbox_bar_picks_nothing() {
        let mut f = fixture();
        f.ctx.set_window_size(1600, 1200);
        let mut queue = InputQueue::new(8);
        press_at(&mut queue, 800.0, 50.0);
        f.ctx.begin_frame(&mut queue);
        assert_eq!(f.ctx.pick_target_pixel(), None);
    }

    #[test]
    fn sentinel_and_unknown_ids_resolve_to_none() {
        let mut f = fixture();
        assert_eq!(f.ctx.resolve_pick(ObjectId::PICK_NONE), None);
        assert_eq!(f.ctx.resolve_pick(9999), None);
        assert_eq!(f.ctx.selection(), None);
    }

    #[test]
    fn live_object_id_resolves_and_is_announced() {
        let mut f = fixture();
        let id = f.ctx.scene().unwrap().game_objects()[0].id();

        let announced = Rc::new(Cell::new(false));
        let a = announced.clone();
        f.ctx.events().subscribe(move |_src: Option<ObjectId>, ev: &Event| {
            if ev.kind() == EventKind::ObjectPicked {
                a.set(true);
            }
        });

        assert_eq!(f.ctx.resolve_pick(id.to_pick()), Some(id));
        assert_eq!(f.ctx.selection(), Some(id));
        assert!(announced.get());
    }

    // ── scene requests ────────────────────────────────────────────────────

    #[test]
    fn start_play_switches_after_the_frame() {
        let mut f = fixture();
        f.ctx.events().notify(None, &Event::new(EventKind::GameEngineStartPlay));
        assert_eq!(f.ctx.scenes().current_index(), Some(0));

        f.ctx.end_frame();
        assert_eq!(f.ctx.scenes().current_index(), Some(1));
        assert_eq!(f.ctx.scene().map(|s| s.name()), Some("level"));
        assert_eq!(f.saves.get(), 1);
    }

    #[test]
    fn stop_play_returns_to_editor() {
        let mut f = fixture();
        f.ctx.events().notify(None, &Event::new(EventKind::GameEngineStartPlay));
        f.ctx.end_frame();
        f.ctx.events().notify(None, &Event::new(EventKind::GameEngineStopPlay));
        f.ctx.end_frame();
        assert_eq!(f.ctx.scenes().current_index(), Some(0));
        // Only the editor scene was saved, on the way into play.
        assert_eq!(f.saves.get(), 1);
    }

    #[test]
    fn load_level_rebuilds_without_saving() {
        let mut f = fixture();
        let before: Vec<_> = f.ctx.scene().unwrap().game_objects().iter().map(|o| o.id()).collect();

        f.ctx.events().notify(None, &Event::new(EventKind::LoadLevel));
        f.ctx.end_frame();

        let scene = f.ctx.scene().unwrap();
        assert_eq!(f.ctx.scenes().current_index(), Some(0));
        assert_eq!(scene.game_objects().len(), before.len());
        assert!(scene.game_objects().iter().all(|o| !before.contains(&o.id())));
        assert_eq!(f.saves.get(), 0);
    }

    #[test]
    fn save_level_saves_without_switching() {
        let mut f = fixture();
        f.ctx.events().notify(None, &Event::new(EventKind::SaveLevel));
        f.ctx.end_frame();
        assert_eq!(f.saves.get(), 1);
        assert_eq!(f.ctx.scenes().current_index(), Some(0));
    }

    // ── shutdown ──────────────────────────────────────────────────────────

    #[test]
    fn shutdown_saves_exactly_once() {
        let mut f = fixture();
        f.ctx.shutdown();
        f.ctx.shutdown();
        assert_eq!(f.saves.get(), 1);
        assert!(f.ctx.is_shut_down());
    }

    struct Unsaveable;

    impl SceneInitializer for Unsaveable {
        fn name(&self) -> &str {
            "unsaveable"
        }

        fn load_resources(&mut self, _scene: &mut Scene, _cache: &mut ResourceCache) -> Result<()> {
            Ok(())
        }

        fn init(&mut self, _scene: &mut Scene, _cache: &mut ResourceCache) -> Result<()> {
            Ok(())
        }

        fn save(&mut self, _scene: &Scene) -> Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[test]
    fn failed_save_still_shuts_down() {
        let mut ctx = EngineContext::new(EngineConfig::default());
        ctx.register_scene(|| Box::new(Unsaveable));
        ctx.start();
        let listeners = ctx.events().listener_count();

        ctx.shutdown();

        assert!(ctx.is_shut_down());
        assert_eq!(ctx.events().listener_count(), listeners - 1);
    }

    #[test]
    fn failed_save_does_not_block_start_play() {
        let mut ctx = EngineContext::new(EngineConfig::default());
        ctx.register_scene(|| Box::new(Unsaveable));
        let updates = Rc::new(Cell::new(0));
        let saves = Rc::new(Cell::new(0));
        let (u, s) = (updates.clone(), saves.clone());
        ctx.register_scene(move || Box::new(TestScene { name: "level", updates: u.clone(), saves: s.clone() }));
        ctx.start();

        ctx.events().notify(None, &Event::new(EventKind::GameEngineStartPlay));
        ctx.end_frame();

        let scene = ctx.scene().unwrap();
        assert_eq!(scene.name(), "level");
        assert!(scene.is_running());
        assert_eq!(scene.game_objects().len(), 1);
    }
}
