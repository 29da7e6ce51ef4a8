use std::rc::Rc;

/// Registered sound clip.
///
/// Playback belongs to an audio backend outside the engine core; the handle
/// only records what a scene declared it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundHandle {
    pub(crate) path: Rc<str>,
    pub(crate) looping: bool,
}

impl SoundHandle {
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn is_looping(&self) -> bool {
        self.looping
    }
}
