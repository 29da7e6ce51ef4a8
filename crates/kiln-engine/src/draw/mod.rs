//! Draw stream types.
//!
//! Responsibilities:
//! - store renderer-agnostic sprite commands
//! - provide deterministic paint order (z-index, then insertion order)

mod key;
mod list;
mod sprite;
mod z_index;

pub use key::SortKey;
pub use list::{DrawItem, DrawList};
pub use sprite::SpriteCmd;
pub use z_index::ZIndex;
