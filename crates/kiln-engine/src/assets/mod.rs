//! Resource cache.
//!
//! Resources are requested by path and cached for the lifetime of the cache:
//! asking for the same path twice yields the same handle and never touches
//! the disk again. GPU uploads are not done here; renderers upload texture
//! pixels lazily, keyed by `TextureId`.

mod cache;
mod shader;
mod sound;
mod spritesheet;
mod texture;

pub use cache::{ResourceCache, DEFAULT_SHADER, PICKING_SHADER};
pub use shader::{ShaderHandle, ShaderId};
pub use sound::SoundHandle;
pub use spritesheet::{Sprite, Spritesheet};
pub use texture::{TextureData, TextureHandle, TextureId};
