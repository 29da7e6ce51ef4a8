use crate::coords::Rect;

use super::component::{Capability, Component, ComponentCtx, ComponentKind, Siblings, UpdateEnv};
use super::{ObjectId, Transform};

/// Named entity composed of components.
#[derive(Debug)]
pub struct GameObject {
    id: ObjectId,
    name: String,
    pub transform: Transform,
    components: Vec<Component>,
    dead: bool,
}

impl GameObject {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            transform: Transform::default(),
            components: Vec::new(),
            dead: false,
        }
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Flags the object for removal at the end of the current update pass.
    pub fn destroy(&mut self) {
        self.dead = true;
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.transform.bounds()
    }

    // ── building ──────────────────────────────────────────────────────────

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_component(mut self, component: impl Into<Component>) -> Self {
        self.add_component(component);
        self
    }

    pub fn add_component(&mut self, component: impl Into<Component>) {
        self.components.push(component.into());
    }

    /// Removes and returns the first component with the given capability.
    pub fn remove_component(&mut self, capability: Capability) -> Option<Component> {
        let index = self.components.iter().position(|c| c.capability() == capability)?;
        Some(self.components.remove(index))
    }

    // ── lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// First component of the given built-in kind.
    pub fn get<T: ComponentKind>(&self) -> Option<&T> {
        self.components.iter().find_map(T::from_component)
    }

    pub fn get_mut<T: ComponentKind>(&mut self) -> Option<&mut T> {
        self.components.iter_mut().find_map(T::from_component_mut)
    }

    /// First component with the given capability.
    pub fn find(&self, capability: Capability) -> Option<&Component> {
        self.components.iter().find(|c| c.capability() == capability)
    }

    pub fn find_mut(&mut self, capability: Capability) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.capability() == capability)
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    pub(crate) fn start(&mut self, env: &mut UpdateEnv<'_>) {
        self.run(env, |c, ctx| c.behavior_mut().start(ctx));
    }

    pub(crate) fn update(&mut self, dt: f32, env: &mut UpdateEnv<'_>) {
        self.run(env, |c, ctx| c.behavior_mut().update(dt, ctx));
    }

    pub(crate) fn editor_update(&mut self, dt: f32, env: &mut UpdateEnv<'_>) {
        self.run(env, |c, ctx| c.behavior_mut().editor_update(dt, ctx));
    }

    /// Runs `f` on each component in order, handing it the rest of the object.
    fn run<F>(&mut self, env: &mut UpdateEnv<'_>, mut f: F)
    where
        F: FnMut(&mut Component, &mut ComponentCtx<'_>),
    {
        for i in 0..self.components.len() {
            let (before, rest) = self.components.split_at_mut(i);
            let Some((current, after)) = rest.split_first_mut() else { break };

            let mut ctx = ComponentCtx::new(
                self.id,
                &mut self.transform,
                &mut self.dead,
                Siblings::new(before, after),
                env,
            );
            f(current, &mut ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::event::EventChannel;
    use crate::input::{InputFrame, InputState};
    use crate::object::{Behavior, IdAllocator, SpriteRenderer, StateMachine};
    use crate::paint::Color;
    use crate::scene::Camera;

    const RED: Color = Color::from_premul(1.0, 0.0, 0.0, 1.0);
    const BLUE: Color = Color::from_premul(0.0, 0.0, 1.0, 1.0);

    fn object(name: &str) -> GameObject {
        GameObject::new(IdAllocator::new().allocate(), name)
    }

    fn with_env(f: impl FnOnce(&mut UpdateEnv<'_>)) {
        let mut camera = Camera::default();
        let events = EventChannel::new();
        let input = InputState::default();
        let input_frame = InputFrame::default();
        let mut spawned = Vec::new();
        let mut ids = IdAllocator::new();
        let mut env = UpdateEnv {
            camera: &mut camera,
            events: &events,
            input: &input,
            input_frame: &input_frame,
            objects: &[],
            spawned: &mut spawned,
            ids: &mut ids,
        };
        f(&mut env);
    }

    fn color_of(c: &Component) -> Option<Color> {
        match c {
            Component::SpriteRenderer(r) => Some(r.color()),
            _ => None,
        }
    }

    /// Records what its siblings look like when started.
    struct Inspector {
        sibling_count: Rc<Cell<usize>>,
        sees_itself: Rc<Cell<bool>>,
    }

    impl Inspector {
        const CAPABILITY: Capability = Capability::new("inspector");
    }

    impl Behavior for Inspector {
        fn capability(&self) -> Capability {
            Self::CAPABILITY
        }

        fn start(&mut self, ctx: &mut ComponentCtx<'_>) {
            self.sibling_count.set(ctx.siblings.iter().count());
            self.sees_itself.set(ctx.siblings.find(Self::CAPABILITY).is_some());
        }
    }

    /// Recolors the sibling renderer on every update.
    struct Painter;

    impl Behavior for Painter {
        fn capability(&self) -> Capability {
            Capability::new("painter")
        }

        fn update(&mut self, _dt: f32, ctx: &mut ComponentCtx<'_>) {
            if let Some(Component::SpriteRenderer(r)) = ctx.siblings.find_mut(SpriteRenderer::CAPABILITY) {
                r.set_color(BLUE);
            }
        }
    }

    // ── lookup ────────────────────────────────────────────────────────────

    #[test]
    fn find_returns_first_match() {
        let obj = object("twins")
            .with_component(SpriteRenderer::new().with_color(RED))
            .with_component(SpriteRenderer::new().with_color(BLUE));

        let found = obj.find(SpriteRenderer::CAPABILITY).and_then(color_of);
        assert_eq!(found, Some(RED));
        assert_eq!(obj.get::<SpriteRenderer>().map(|r| r.color()), Some(RED));
    }

    #[test]
    fn missing_capability_is_none() {
        let mut obj = object("plain").with_component(SpriteRenderer::new());
        assert!(obj.find(StateMachine::CAPABILITY).is_none());
        assert!(obj.find_mut(Capability::new("physics_body")).is_none());
        assert!(obj.get::<StateMachine>().is_none());
    }

    #[test]
    fn find_mut_edits_in_place() {
        let mut obj = object("tinted").with_component(SpriteRenderer::new().with_color(RED));
        if let Some(Component::SpriteRenderer(r)) = obj.find_mut(SpriteRenderer::CAPABILITY) {
            r.set_color(BLUE);
        }
        assert_eq!(obj.get::<SpriteRenderer>().map(|r| r.color()), Some(BLUE));
    }

    #[test]
    fn remove_takes_only_the_first_match() {
        let mut obj = object("twins")
            .with_component(SpriteRenderer::new().with_color(RED))
            .with_component(StateMachine::new())
            .with_component(SpriteRenderer::new().with_color(BLUE));

        let removed = obj.remove_component(SpriteRenderer::CAPABILITY);
        assert_eq!(removed.as_ref().and_then(color_of), Some(RED));
        assert_eq!(obj.components().len(), 2);
        assert_eq!(obj.get::<SpriteRenderer>().map(|r| r.color()), Some(BLUE));
        assert!(obj.remove_component(Capability::new("physics_body")).is_none());
    }

    // ── siblings ──────────────────────────────────────────────────────────

    #[test]
    fn siblings_exclude_the_running_component() {
        let sibling_count = Rc::new(Cell::new(usize::MAX));
        let sees_itself = Rc::new(Cell::new(true));
        let mut obj = object("inspected")
            .with_component(SpriteRenderer::new())
            .with_component(Box::new(Inspector {
                sibling_count: sibling_count.clone(),
                sees_itself: sees_itself.clone(),
            }))
            .with_component(StateMachine::new());

        with_env(|env| obj.start(env));

        assert_eq!(sibling_count.get(), 2);
        assert!(!sees_itself.get());
    }

    #[test]
    fn sibling_found_by_capability_is_mutated() {
        let mut obj = object("painted")
            .with_component(Box::new(Painter))
            .with_component(SpriteRenderer::new().with_color(RED));

        with_env(|env| obj.update(0.016, env));

        assert_eq!(obj.get::<SpriteRenderer>().map(|r| r.color()), Some(BLUE));
    }
}
