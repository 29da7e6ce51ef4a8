use anyhow::{Context, Result};

use crate::assets::ResourceCache;
use crate::draw::{DrawList, SpriteCmd, ZIndex};
use crate::engine::OverlayFrame;
use crate::event::EventChannel;
use crate::input::{InputFrame, InputState};
use crate::object::{
    ComponentKind, GameObject, IdAllocator, ObjectId, ObjectInfo, SpriteRenderer, UpdateEnv,
};

use super::{Camera, SceneInitializer};

/// Which component hook a scene drives each frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SceneMode {
    /// `editor_update`: authoring, no gameplay.
    Editor,
    /// `update`: gameplay.
    Play,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
enum Stage {
    Created,
    Loaded,
    Initialized,
    Running,
    Destroyed,
}

/// The active level: its game objects, its camera and its initializer.
pub struct Scene {
    name: String,
    mode: SceneMode,
    stage: Stage,
    initializer: Option<Box<dyn SceneInitializer>>,
    objects: Vec<GameObject>,
    camera: Camera,
    ids: IdAllocator,
    events: EventChannel,
}

impl Scene {
    pub(crate) fn new(
        initializer: Box<dyn SceneInitializer>,
        events: EventChannel,
        ids: IdAllocator,
    ) -> Self {
        Self {
            name: initializer.name().to_owned(),
            mode: initializer.mode(),
            stage: Stage::Created,
            initializer: Some(initializer),
            objects: Vec::new(),
            camera: Camera::default(),
            ids,
            events,
        }
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn mode(&self) -> SceneMode {
        self.mode
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.stage == Stage::Running
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// The engine-wide event channel.
    #[inline]
    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    /// Runs the initializer's resource declarations.
    pub fn load(&mut self, cache: &mut ResourceCache) -> Result<()> {
        debug_assert_eq!(self.stage, Stage::Created, "scene loaded twice");
        let mut init = self.take_initializer()?;
        let result = init.load_resources(self, cache);
        self.initializer = Some(init);
        self.stage = Stage::Loaded;
        result.with_context(|| format!("scene '{}' failed to load resources", self.name))
    }

    /// Runs the initializer's object setup.
    pub fn init(&mut self, cache: &mut ResourceCache) -> Result<()> {
        debug_assert!(self.stage <= Stage::Loaded, "scene initialized after start");
        let mut init = self.take_initializer()?;
        let result = init.init(self, cache);
        self.initializer = Some(init);
        self.stage = Stage::Initialized;
        result.with_context(|| format!("scene '{}' failed to initialize", self.name))
    }

    /// Starts every object in insertion order and marks the scene running.
    ///
    /// Objects added afterwards are started as they are added.
    pub fn start(&mut self) {
        if self.stage >= Stage::Running {
            log::warn!("scene '{}' already started", self.name);
            return;
        }
        let input = InputState::default();
        let input_frame = InputFrame::default();
        let infos = self.snapshot();
        let mut spawned = Vec::new();
        {
            let mut env = UpdateEnv {
                camera: &mut self.camera,
                events: &self.events,
                input: &input,
                input_frame: &input_frame,
                objects: &infos,
                spawned: &mut spawned,
                ids: &mut self.ids,
            };
            for obj in self.objects.iter_mut() {
                obj.start(&mut env);
            }
        }
        self.stage = Stage::Running;
        self.finish_pass(spawned);
        log::debug!("scene '{}' started with {} objects", self.name, self.objects.len());
    }

    /// Advances one frame through the hook matching the scene's mode.
    pub fn tick(&mut self, dt: f32, input: &InputState, input_frame: &InputFrame) {
        match self.mode {
            SceneMode::Play => self.update(dt, input, input_frame),
            SceneMode::Editor => self.editor_update(dt, input, input_frame),
        }
    }

    /// Gameplay pass: `update(dt)` on every live object, then removes the dead.
    pub fn update(&mut self, dt: f32, input: &InputState, input_frame: &InputFrame) {
        self.pass(input, input_frame, |obj, env| obj.update(dt, env));
    }

    /// Authoring pass: `editor_update(dt)` on every live object, then
    /// removes the dead.
    pub fn editor_update(&mut self, dt: f32, input: &InputState, input_frame: &InputFrame) {
        self.pass(input, input_frame, |obj, env| obj.editor_update(dt, env));
    }

    /// Emits one sprite quad per live object carrying a `SpriteRenderer`.
    pub fn render(&self, list: &mut DrawList) {
        for obj in self.objects.iter().filter(|o| !o.is_dead()) {
            let Some(renderer) = obj.get::<SpriteRenderer>() else { continue };
            let transform = &obj.transform;
            list.push_sprite(
                ZIndex(transform.z_index),
                SpriteCmd::from_sprite(
                    Some(obj.id()),
                    transform.bounds(),
                    transform.rotation.to_radians(),
                    renderer.sprite(),
                    renderer.color(),
                ),
            );
        }
    }

    /// Lets the initializer add its overlay affordances.
    pub fn imgui(&self, ui: &mut OverlayFrame<'_>) {
        if let Some(init) = &self.initializer {
            init.imgui(self, ui);
        }
    }

    /// Persists scene state through the initializer.
    pub fn save_exit(&mut self) -> Result<()> {
        let mut init = self.take_initializer()?;
        let result = init.save(self);
        self.initializer = Some(init);
        result.with_context(|| format!("scene '{}' failed to save", self.name))
    }

    /// Drops every object; the scene renders nothing afterwards.
    pub fn destroy(&mut self) {
        self.objects.clear();
        self.stage = Stage::Destroyed;
    }

    /// Hands the id allocator back so ids stay unique across scenes.
    pub(crate) fn into_ids(self) -> IdAllocator {
        self.ids
    }

    // ── objects ───────────────────────────────────────────────────────────

    /// Builds a new object with the next creation-order id. It joins the
    /// scene once passed to [`add_game_object`](Self::add_game_object).
    pub fn create_game_object(&mut self, name: impl Into<String>) -> GameObject {
        GameObject::new(self.ids.allocate(), name)
    }

    /// Appends an object; a running scene starts it immediately.
    pub fn add_game_object(&mut self, object: GameObject) -> ObjectId {
        let id = object.id();
        self.objects.push(object);
        if self.is_running() {
            self.start_last();
        }
        id
    }

    pub fn game_object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn game_object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    /// First live object carrying a `T` component.
    pub fn game_object_with<T: ComponentKind>(&self) -> Option<&GameObject> {
        self.objects
            .iter()
            .find(|o| !o.is_dead() && o.get::<T>().is_some())
    }

    /// Objects in insertion order.
    #[inline]
    pub fn game_objects(&self) -> &[GameObject] {
        &self.objects
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn take_initializer(&mut self) -> Result<Box<dyn SceneInitializer>> {
        self.initializer
            .take()
            .with_context(|| format!("scene '{}' initializer re-entered", self.name))
    }

    fn snapshot(&self) -> Vec<ObjectInfo> {
        self.objects
            .iter()
            .map(|o| ObjectInfo {
                id: o.id(),
                transform: o.transform,
                dead: o.is_dead(),
            })
            .collect()
    }

    fn pass<F>(&mut self, input: &InputState, input_frame: &InputFrame, mut f: F)
    where
        F: FnMut(&mut GameObject, &mut UpdateEnv<'_>),
    {
        if !self.is_running() {
            return;
        }
        let infos = self.snapshot();
        let mut spawned = Vec::new();
        {
            let mut env = UpdateEnv {
                camera: &mut self.camera,
                events: &self.events,
                input,
                input_frame,
                objects: &infos,
                spawned: &mut spawned,
                ids: &mut self.ids,
            };
            for obj in self.objects.iter_mut().filter(|o| !o.is_dead()) {
                f(obj, &mut env);
            }
        }
        self.finish_pass(spawned);
    }

    fn finish_pass(&mut self, spawned: Vec<GameObject>) {
        for obj in spawned {
            self.add_game_object(obj);
        }
        let before = self.objects.len();
        self.objects.retain(|o| !o.is_dead());
        let removed = before - self.objects.len();
        if removed > 0 {
            log::trace!("scene '{}' removed {removed} dead objects", self.name);
        }
    }

    /// Starts the most recently added object.
    fn start_last(&mut self) {
        let input = InputState::default();
        let input_frame = InputFrame::default();
        let infos = self.snapshot();
        let mut spawned = Vec::new();
        if let Some(obj) = self.objects.last_mut() {
            let mut env = UpdateEnv {
                camera: &mut self.camera,
                events: &self.events,
                input: &input,
                input_frame: &input_frame,
                objects: &infos,
                spawned: &mut spawned,
                ids: &mut self.ids,
            };
            obj.start(&mut env);
        }
        for obj in spawned {
            self.add_game_object(obj);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::coords::Vec2;
    use crate::object::{Behavior, Capability, ComponentCtx, Transform};

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        log: Log,
        die_after: Option<u32>,
        updates: u32,
    }

    impl Recorder {
        fn new(log: &Log) -> Self {
            Self { log: log.clone(), die_after: None, updates: 0 }
        }
    }

    impl Behavior for Recorder {
        fn capability(&self) -> Capability {
            Capability::new("recorder")
        }

        fn start(&mut self, ctx: &mut ComponentCtx<'_>) {
            self.log.borrow_mut().push(format!("start {}", ctx.object));
        }

        fn update(&mut self, _dt: f32, ctx: &mut ComponentCtx<'_>) {
            self.updates += 1;
            self.log.borrow_mut().push(format!("update {}", ctx.object));
            if self.die_after == Some(self.updates) {
                ctx.destroy();
            }
        }

        fn editor_update(&mut self, _dt: f32, ctx: &mut ComponentCtx<'_>) {
            self.log.borrow_mut().push(format!("edit {}", ctx.object));
        }
    }

    struct Spawner;

    impl Behavior for Spawner {
        fn capability(&self) -> Capability {
            Capability::new("spawner")
        }

        fn update(&mut self, _dt: f32, ctx: &mut ComponentCtx<'_>) {
            let child = ctx
                .create_game_object("child")
                .with_transform(Transform::new(Vec2::new(5.0, 5.0), Vec2::splat(4.0)));
            ctx.spawn(child);
        }
    }

    struct Empty(SceneMode);

    impl SceneInitializer for Empty {
        fn name(&self) -> &str {
            "empty"
        }

        fn mode(&self) -> SceneMode {
            self.0
        }

        fn load_resources(&mut self, _scene: &mut Scene, _cache: &mut ResourceCache) -> Result<()> {
            Ok(())
        }

        fn init(&mut self, _scene: &mut Scene, _cache: &mut ResourceCache) -> Result<()> {
            Ok(())
        }
    }

    fn scene(mode: SceneMode) -> Scene {
        let mut s = Scene::new(Box::new(Empty(mode)), EventChannel::new(), IdAllocator::new());
        let mut cache = ResourceCache::new();
        s.load(&mut cache).unwrap();
        s.init(&mut cache).unwrap();
        s
    }

    fn add_recorder(s: &mut Scene, log: &Log, die_after: Option<u32>) -> ObjectId {
        let mut rec = Recorder::new(log);
        rec.die_after = die_after;
        let obj = s.create_game_object("rec").with_component(Box::new(rec));
        s.add_game_object(obj)
    }

    fn sprite_at(s: &mut Scene, x: f32, z: i32) -> ObjectId {
        let obj = s
            .create_game_object("sprite")
            .with_transform(Transform::new(Vec2::new(x, 0.0), Vec2::splat(32.0)).with_z_index(z))
            .with_component(SpriteRenderer::new());
        s.add_game_object(obj)
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn start_runs_once_per_object_in_insertion_order() {
        let log = Log::default();
        let mut s = scene(SceneMode::Play);
        let a = add_recorder(&mut s, &log, None);
        let b = add_recorder(&mut s, &log, None);
        assert!(log.borrow().is_empty());

        s.start();
        s.start();
        assert_eq!(*log.borrow(), vec![format!("start {a}"), format!("start {b}")]);
    }

    #[test]
    fn objects_added_while_running_start_immediately() {
        let log = Log::default();
        let mut s = scene(SceneMode::Play);
        s.start();
        let a = add_recorder(&mut s, &log, None);
        assert_eq!(*log.borrow(), vec![format!("start {a}")]);
    }

    #[test]
    fn update_before_start_does_nothing() {
        let log = Log::default();
        let mut s = scene(SceneMode::Play);
        add_recorder(&mut s, &log, None);
        s.update(0.016, &InputState::default(), &InputFrame::default());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn tick_dispatches_on_mode() {
        let log = Log::default();
        let mut s = scene(SceneMode::Editor);
        let a = add_recorder(&mut s, &log, None);
        s.start();
        s.tick(0.016, &InputState::default(), &InputFrame::default());
        assert_eq!(log.borrow().last(), Some(&format!("edit {a}")));
    }

    #[test]
    fn dead_objects_are_removed_after_the_pass() {
        let log = Log::default();
        let mut s = scene(SceneMode::Play);
        let a = add_recorder(&mut s, &log, Some(1));
        let b = add_recorder(&mut s, &log, None);
        s.start();
        log.borrow_mut().clear();

        let input = InputState::default();
        let frame = InputFrame::default();
        s.update(0.016, &input, &frame);
        assert!(s.game_object(a).is_none());
        assert_eq!(s.game_objects().len(), 1);

        s.update(0.016, &input, &frame);
        let updates_of_a = log.borrow().iter().filter(|l| **l == format!("update {a}")).count();
        assert_eq!(updates_of_a, 1);
        assert!(log.borrow().contains(&format!("update {b}")));
    }

    #[test]
    fn spawned_objects_join_after_the_pass() {
        let mut s = scene(SceneMode::Play);
        let obj = s.create_game_object("spawner").with_component(Box::new(Spawner));
        s.add_game_object(obj);
        s.start();

        s.update(0.016, &InputState::default(), &InputFrame::default());
        assert_eq!(s.game_objects().len(), 2);
        assert_eq!(s.game_objects()[1].name(), "child");
    }

    #[test]
    fn destroy_empties_the_scene() {
        let mut s = scene(SceneMode::Play);
        sprite_at(&mut s, 0.0, 0);
        s.start();
        s.destroy();

        let mut list = DrawList::new();
        s.render(&mut list);
        assert!(list.is_empty());
        assert!(!s.is_running());
    }

    // ── rendering ─────────────────────────────────────────────────────────

    #[test]
    fn render_emits_one_quad_per_sprite_object_in_z_order() {
        let mut s = scene(SceneMode::Play);
        let high = sprite_at(&mut s, 0.0, 5);
        let low = sprite_at(&mut s, 64.0, -1);
        let plain = s.create_game_object("plain");
        s.add_game_object(plain);
        s.start();

        let mut list = DrawList::new();
        s.render(&mut list);
        let order: Vec<_> = list.iter_in_paint_order().map(|i| i.cmd.object).collect();
        assert_eq!(order, vec![Some(low), Some(high)]);
    }

    #[test]
    fn render_uses_transform_bounds() {
        let mut s = scene(SceneMode::Play);
        let id = sprite_at(&mut s, 64.0, 0);
        s.start();

        let mut list = DrawList::new();
        s.render(&mut list);
        assert_eq!(list.items()[0].cmd.rect, s.game_object(id).unwrap().bounds());
    }

    // ── lookup ────────────────────────────────────────────────────────────

    #[test]
    fn lookup_by_id_and_component() {
        let log = Log::default();
        let mut s = scene(SceneMode::Play);
        add_recorder(&mut s, &log, None);
        let sprite = sprite_at(&mut s, 0.0, 0);

        assert_eq!(s.game_object(sprite).map(|o| o.name()), Some("sprite"));
        assert_eq!(s.game_object_with::<SpriteRenderer>().map(|o| o.id()), Some(sprite));
        assert!(s.game_object(ObjectId::from_pick(999).unwrap()).is_none());
    }
}
