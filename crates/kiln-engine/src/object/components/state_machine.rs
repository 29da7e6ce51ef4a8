use std::collections::HashMap;

use crate::assets::{ResourceCache, Sprite};
use crate::object::{Behavior, Capability, ComponentCtx, ComponentKind, SpriteRenderer};

/// One frame of an animation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    pub sprite: Sprite,
    /// Seconds this frame stays on screen.
    pub duration: f32,
}

/// Named sequence of frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    name: String,
    frames: Vec<AnimationFrame>,
    looping: bool,
}

impl Animation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: Vec::new(),
            looping: true,
        }
    }

    pub fn with_frame(mut self, sprite: Sprite, duration: f32) -> Self {
        self.frames.push(AnimationFrame { sprite, duration });
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }
}

/// Animation state machine.
///
/// Holds named animations and trigger-driven transitions between them. Every
/// update advances the current animation and pushes its frame into the
/// sibling `SpriteRenderer`, if the object has one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateMachine {
    states: Vec<Animation>,
    transitions: HashMap<(String, String), String>,
    default_state: Option<String>,
    current: Option<usize>,
    frame: usize,
    time: f32,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an animation; the first one added becomes the default state.
    pub fn with_state(mut self, animation: Animation) -> Self {
        self.add_state(animation);
        self
    }

    pub fn with_transition(mut self, from: &str, trigger: &str, to: &str) -> Self {
        self.add_transition(from, trigger, to);
        self
    }

    pub fn add_state(&mut self, animation: Animation) {
        if self.default_state.is_none() {
            self.default_state = Some(animation.name.clone());
        }
        self.states.push(animation);
    }

    pub fn add_transition(&mut self, from: &str, trigger: &str, to: &str) {
        self.transitions
            .insert((from.to_string(), trigger.to_string()), to.to_string());
    }

    pub fn set_default_state(&mut self, name: &str) {
        if self.index_of(name).is_some() {
            self.default_state = Some(name.to_string());
        } else {
            log::warn!("state machine has no state '{name}'");
        }
    }

    pub fn current_state(&self) -> Option<&str> {
        self.current.map(|i| self.states[i].name.as_str())
    }

    /// Sprite of the frame currently showing.
    pub fn current_sprite(&self) -> Option<&Sprite> {
        let state = &self.states[self.current?];
        state.frames.get(self.frame).map(|f| &f.sprite)
    }

    /// Follows the transition registered for `trigger` from the current state.
    ///
    /// Returns `false` when no such transition exists.
    pub fn trigger(&mut self, trigger: &str) -> bool {
        let Some(current) = self.current_state() else { return false };
        let key = (current.to_string(), trigger.to_string());
        let Some(target) = self.transitions.get(&key) else { return false };
        let Some(index) = self.index_of(target) else {
            log::warn!("transition '{trigger}' leads to unknown state '{target}'");
            return false;
        };
        self.enter(index);
        true
    }

    /// Re-resolves every frame's texture through `cache`.
    pub fn refresh_textures(&mut self, cache: &mut ResourceCache) {
        for frame in self.states.iter_mut().flat_map(|s| s.frames.iter_mut()) {
            let Some(texture) = frame.sprite.texture.as_ref() else { continue };
            match cache.texture(texture.path()) {
                Ok(fresh) => frame.sprite.texture = Some(fresh),
                Err(e) => log::warn!("animation texture refresh failed: {e:#}"),
            }
        }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.states.iter().position(|s| s.name == name)
    }

    fn enter(&mut self, index: usize) {
        self.current = Some(index);
        self.frame = 0;
        self.time = 0.0;
    }

    fn advance(&mut self, dt: f32) {
        let Some(current) = self.current else { return };
        let state = &self.states[current];
        if state.frames.is_empty() {
            return;
        }

        self.time += dt;
        // Several frames may elapse in one long step.
        while let Some(frame) = state.frames.get(self.frame) {
            if self.time < frame.duration || frame.duration <= 0.0 {
                break;
            }
            if self.frame + 1 < state.frames.len() {
                self.time -= frame.duration;
                self.frame += 1;
            } else if state.looping {
                self.time -= frame.duration;
                self.frame = 0;
            } else {
                break;
            }
        }
    }

    fn apply(&self, ctx: &mut ComponentCtx<'_>) {
        let Some(sprite) = self.current_sprite() else { return };
        if let Some(renderer) = ctx.siblings.get_mut::<SpriteRenderer>() {
            renderer.set_sprite(sprite.clone());
        }
    }
}

impl Behavior for StateMachine {
    fn capability(&self) -> Capability {
        Self::CAPABILITY
    }

    fn start(&mut self, ctx: &mut ComponentCtx<'_>) {
        if let Some(index) = self.default_state.as_deref().and_then(|name| self.index_of(name)) {
            self.enter(index);
        }
        self.apply(ctx);
    }

    fn update(&mut self, dt: f32, ctx: &mut ComponentCtx<'_>) {
        self.advance(dt);
        self.apply(ctx);
    }

    fn editor_update(&mut self, dt: f32, ctx: &mut ComponentCtx<'_>) {
        self.update(dt, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;

    fn sprite(i: u32) -> Sprite {
        Sprite { texture: None, uv: Rect::new(i as f32, 0.0, 1.0, 1.0), width: i, height: 1 }
    }

    fn machine() -> StateMachine {
        StateMachine::new()
            .with_state(Animation::new("idle").with_frame(sprite(0), 1.0))
            .with_state(
                Animation::new("run")
                    .with_frame(sprite(1), 0.1)
                    .with_frame(sprite(2), 0.1)
                    .with_frame(sprite(3), 0.1),
            )
            .with_state(Animation::new("die").with_frame(sprite(4), 0.1).with_frame(sprite(5), 0.1).looping(false))
            .with_transition("idle", "start_running", "run")
            .with_transition("run", "stop_running", "idle")
            .with_transition("run", "hit", "die")
    }

    fn started() -> StateMachine {
        let mut sm = machine();
        sm.enter(0);
        sm
    }

    // ── transitions ───────────────────────────────────────────────────────

    #[test]
    fn first_state_is_default() {
        assert_eq!(machine().default_state.as_deref(), Some("idle"));
    }

    #[test]
    fn trigger_follows_registered_transition() {
        let mut sm = started();
        assert!(sm.trigger("start_running"));
        assert_eq!(sm.current_state(), Some("run"));
        assert_eq!(sm.current_sprite(), Some(&sprite(1)));
    }

    #[test]
    fn unknown_trigger_is_ignored() {
        let mut sm = started();
        assert!(!sm.trigger("hit"));
        assert_eq!(sm.current_state(), Some("idle"));
    }

    #[test]
    fn nothing_runs_before_start() {
        let mut sm = machine();
        assert!(!sm.trigger("start_running"));
        assert_eq!(sm.current_sprite(), None);
    }

    // ── playback ──────────────────────────────────────────────────────────

    #[test]
    fn frames_advance_with_time() {
        let mut sm = started();
        sm.trigger("start_running");
        sm.advance(0.15);
        assert_eq!(sm.current_sprite(), Some(&sprite(2)));
    }

    #[test]
    fn looping_animation_wraps() {
        let mut sm = started();
        sm.trigger("start_running");
        sm.advance(0.35);
        assert_eq!(sm.current_sprite(), Some(&sprite(1)));
    }

    #[test]
    fn one_shot_animation_holds_last_frame() {
        let mut sm = started();
        sm.trigger("start_running");
        sm.trigger("hit");
        sm.advance(5.0);
        assert_eq!(sm.current_sprite(), Some(&sprite(5)));
    }
}
