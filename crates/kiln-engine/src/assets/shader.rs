use std::rc::Rc;

/// Stable identity of a cached shader.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderId(pub(crate) u32);

/// WGSL source registered under a path.
///
/// Both entry points are expected to be named `vs_main` / `fs_main`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderHandle {
    pub(crate) id: ShaderId,
    pub(crate) path: Rc<str>,
    pub(crate) source: Rc<str>,
}

impl ShaderHandle {
    #[inline]
    pub fn id(&self) -> ShaderId {
        self.id
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }
}
