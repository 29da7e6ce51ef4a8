use std::fmt;

use crate::coords::Rect;
use crate::event::{Event, EventChannel};
use crate::input::{InputFrame, InputState};
use crate::scene::Camera;

use super::components::{GameCamera, SpriteRenderer, StateMachine};
use super::{GameObject, IdAllocator, ObjectId, Transform};

/// Stable identifier of what a component can do.
///
/// Lookups match on this value, never on runtime type information.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Capability(&'static str);

impl Capability {
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Lifecycle contract every component implements.
///
/// `start` runs exactly once, when the owning object joins a started scene
/// (or when the scene starts). `update` runs every frame in play mode,
/// `editor_update` every frame in editor mode.
pub trait Behavior {
    fn capability(&self) -> Capability;

    fn start(&mut self, _ctx: &mut ComponentCtx<'_>) {}

    fn update(&mut self, _dt: f32, _ctx: &mut ComponentCtx<'_>) {}

    fn editor_update(&mut self, _dt: f32, _ctx: &mut ComponentCtx<'_>) {}
}

/// A component slot on a game object.
pub enum Component {
    SpriteRenderer(SpriteRenderer),
    StateMachine(StateMachine),
    GameCamera(GameCamera),
    Behavior(Box<dyn Behavior>),
}

impl Component {
    pub fn behavior(&self) -> &dyn Behavior {
        match self {
            Component::SpriteRenderer(c) => c,
            Component::StateMachine(c) => c,
            Component::GameCamera(c) => c,
            Component::Behavior(b) => b.as_ref(),
        }
    }

    pub fn behavior_mut(&mut self) -> &mut dyn Behavior {
        match self {
            Component::SpriteRenderer(c) => c,
            Component::StateMachine(c) => c,
            Component::GameCamera(c) => c,
            Component::Behavior(b) => b.as_mut(),
        }
    }

    #[inline]
    pub fn capability(&self) -> Capability {
        self.behavior().capability()
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.capability()).finish()
    }
}

impl<B: Behavior + 'static> From<Box<B>> for Component {
    fn from(b: Box<B>) -> Self {
        Component::Behavior(b)
    }
}

/// Built-in component variants with typed access.
pub trait ComponentKind: Behavior + Sized {
    const CAPABILITY: Capability;

    fn from_component(c: &Component) -> Option<&Self>;

    fn from_component_mut(c: &mut Component) -> Option<&mut Self>;
}

macro_rules! component_kind {
    ($ty:ident, $name:literal) => {
        impl ComponentKind for $ty {
            const CAPABILITY: Capability = Capability::new($name);

            #[inline]
            fn from_component(c: &Component) -> Option<&Self> {
                match c {
                    Component::$ty(inner) => Some(inner),
                    _ => None,
                }
            }

            #[inline]
            fn from_component_mut(c: &mut Component) -> Option<&mut Self> {
                match c {
                    Component::$ty(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Component {
            fn from(c: $ty) -> Self {
                Component::$ty(c)
            }
        }
    };
}

component_kind!(SpriteRenderer, "sprite_renderer");
component_kind!(StateMachine, "state_machine");
component_kind!(GameCamera, "game_camera");

/// The other components of the object whose component is currently running.
pub struct Siblings<'a> {
    before: &'a mut [Component],
    after: &'a mut [Component],
}

impl<'a> Siblings<'a> {
    pub(crate) fn new(before: &'a mut [Component], after: &'a mut [Component]) -> Self {
        Self { before, after }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.before.iter().chain(self.after.iter())
    }

    /// First sibling of the given built-in kind.
    pub fn get<T: ComponentKind>(&self) -> Option<&T> {
        self.iter().find_map(T::from_component)
    }

    pub fn get_mut<T: ComponentKind>(&mut self) -> Option<&mut T> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .find_map(T::from_component_mut)
    }

    /// First sibling with the given capability.
    pub fn find(&self, capability: Capability) -> Option<&Component> {
        self.iter().find(|c| c.capability() == capability)
    }

    pub fn find_mut(&mut self, capability: Capability) -> Option<&mut Component> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .find(|c| c.capability() == capability)
    }
}

/// Read-only view of another object, captured at the start of a pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ObjectInfo {
    pub id: ObjectId,
    pub transform: Transform,
    pub dead: bool,
}

impl ObjectInfo {
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.transform.bounds()
    }
}

/// Scene-level state borrowed for one lifecycle pass.
pub(crate) struct UpdateEnv<'a> {
    pub camera: &'a mut Camera,
    pub events: &'a EventChannel,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub objects: &'a [ObjectInfo],
    pub spawned: &'a mut Vec<GameObject>,
    pub ids: &'a mut IdAllocator,
}

/// What a running component can see and touch.
pub struct ComponentCtx<'a> {
    pub object: ObjectId,
    pub transform: &'a mut Transform,
    pub siblings: Siblings<'a>,
    pub camera: &'a mut Camera,
    pub events: &'a EventChannel,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    objects: &'a [ObjectInfo],
    dead: &'a mut bool,
    spawned: &'a mut Vec<GameObject>,
    ids: &'a mut IdAllocator,
}

impl<'a> ComponentCtx<'a> {
    pub(crate) fn new(
        object: ObjectId,
        transform: &'a mut Transform,
        dead: &'a mut bool,
        siblings: Siblings<'a>,
        env: &'a mut UpdateEnv<'_>,
    ) -> Self {
        Self {
            object,
            transform,
            siblings,
            camera: &mut *env.camera,
            events: env.events,
            input: env.input,
            input_frame: env.input_frame,
            objects: env.objects,
            dead,
            spawned: &mut *env.spawned,
            ids: &mut *env.ids,
        }
    }

    /// Flags the owning object dead; it is removed after the current pass.
    pub fn destroy(&mut self) {
        *self.dead = true;
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        *self.dead
    }

    /// Snapshot of another object, as it was when the pass began.
    pub fn object_info(&self, id: ObjectId) -> Option<&ObjectInfo> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Builds a new object with the next creation-order id.
    pub fn create_game_object(&mut self, name: impl Into<String>) -> GameObject {
        GameObject::new(self.ids.allocate(), name)
    }

    /// Adds an object to the scene once the current pass finishes; it is
    /// started right away since the scene is running.
    pub fn spawn(&mut self, object: GameObject) {
        self.spawned.push(object);
    }

    /// Posts an event with the owning object as source.
    pub fn post(&self, event: Event) {
        self.events.notify(Some(self.object), &event);
    }
}
