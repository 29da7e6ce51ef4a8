use crate::object::{Behavior, Capability, ComponentCtx, ComponentKind, ObjectId};

/// Side-scrolling camera follower.
///
/// Keeps the target `offset` world units right of the camera's left edge and
/// never scrolls back: the camera only moves to the highest x reached so far.
#[derive(Debug, Clone, PartialEq)]
pub struct GameCamera {
    target: Option<ObjectId>,
    offset: f32,
    highest_x: f32,
}

impl GameCamera {
    pub fn new() -> Self {
        Self {
            target: None,
            offset: 160.0,
            highest_x: f32::NEG_INFINITY,
        }
    }

    pub fn following(target: ObjectId) -> Self {
        Self { target: Some(target), ..Self::new() }
    }

    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    pub fn set_target(&mut self, target: Option<ObjectId>) {
        self.target = target;
    }

    #[inline]
    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    fn follow(&mut self, target_x: f32) -> f32 {
        self.highest_x = (target_x - self.offset).max(self.highest_x);
        self.highest_x
    }
}

impl Default for GameCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Behavior for GameCamera {
    fn capability(&self) -> Capability {
        Self::CAPABILITY
    }

    fn start(&mut self, ctx: &mut ComponentCtx<'_>) {
        self.highest_x = ctx.camera.position.x;
    }

    fn update(&mut self, _dt: f32, ctx: &mut ComponentCtx<'_>) {
        let Some(target) = self.target else { return };
        let Some(info) = ctx.object_info(target).copied() else { return };
        if info.dead {
            return;
        }
        ctx.camera.position.x = self.follow(info.transform.position.x);
    }
}
