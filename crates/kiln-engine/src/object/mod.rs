//! Entity/component model.
//!
//! A `GameObject` owns an ordered list of `Component`s. Built-in components
//! are tagged variants with typed lookup (`GameObject::get::<SpriteRenderer>()`);
//! application components are `Behavior` trait objects looked up by their
//! `Capability`. Every component shares the `{start, update, editor_update}`
//! contract of the `Behavior` trait.

mod component;
mod components;
mod game_object;
mod id;
mod transform;

pub use component::{Behavior, Capability, Component, ComponentCtx, ComponentKind, ObjectInfo, Siblings};
pub use components::{Animation, AnimationFrame, GameCamera, SpriteRenderer, StateMachine};
pub use game_object::GameObject;
pub use id::{IdAllocator, ObjectId};
pub use transform::Transform;

pub(crate) use component::UpdateEnv;
