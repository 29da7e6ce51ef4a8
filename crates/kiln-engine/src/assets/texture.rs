use std::rc::Rc;

use anyhow::{ensure, Result};

use crate::paint::Color;

/// Stable identity of a cached texture; renderers key GPU uploads by it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureId(pub(crate) u32);

/// Cached texture reference.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureHandle {
    pub(crate) id: TextureId,
    pub(crate) path: Rc<str>,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl TextureHandle {
    #[inline]
    pub fn id(&self) -> TextureId {
        self.id
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Decoded RGBA8 pixels, premultiplied alpha, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextureData {
    /// Takes straight-alpha RGBA8 pixels and premultiplies them.
    pub fn from_straight_rgba8(width: u32, height: u32, mut pixels: Vec<u8>) -> Result<Self> {
        ensure!(width > 0 && height > 0, "texture has zero size ({width}x{height})");
        let expected = width as usize * height as usize * 4;
        ensure!(
            pixels.len() == expected,
            "texture data is {} bytes, expected {expected} for {width}x{height} RGBA8",
            pixels.len()
        );

        for px in pixels.chunks_exact_mut(4) {
            let a = px[3] as u16;
            for c in &mut px[..3] {
                *c = ((*c as u16 * a + 127) / 255) as u8;
            }
        }

        Ok(Self { width, height, pixels })
    }

    /// Single-color texture.
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let px = color.to_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        let count = width.max(1) as usize * height.max(1) as usize;
        Self {
            width: width.max(1),
            height: height.max(1),
            pixels: px.repeat(count),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}
