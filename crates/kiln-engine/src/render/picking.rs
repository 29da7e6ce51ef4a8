use std::sync::mpsc;

use anyhow::{Context, Result};

use crate::device::Gpu;

/// Format of the pick target: one object id per texel.
pub const PICK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Uint;

/// Offscreen id buffer written by the picking pass, read back one texel at a time.
///
/// Cleared to `ObjectId::PICK_NONE` so uncovered texels mean "no object".
pub struct PickingSurface {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    readback: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl PickingSurface {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("kiln pick target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: PICK_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // One padded row holding a single texel.
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kiln pick readback"),
            size: wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            texture,
            view,
            readback,
            width,
            height,
        }
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reads the id stored at texel `(x, y)` (top-left origin).
    ///
    /// Blocks until the GPU has finished all submitted work.
    pub fn read_pixel(&self, gpu: &Gpu<'_>, x: u32, y: u32) -> Result<u32> {
        anyhow::ensure!(
            x < self.width && y < self.height,
            "pick texel ({x}, {y}) outside {}x{} target",
            self.width,
            self.height
        );

        let mut encoder = gpu.create_encoder("kiln pick readback encoder");
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT),
                    rows_per_image: Some(1),
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        gpu.submit_encoder(encoder);

        let slice = self.readback.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        gpu.wait_idle()?;
        rx.recv()
            .context("pick readback was never mapped")?
            .context("failed to map pick readback buffer")?;

        let value = {
            let bytes = slice.get_mapped_range();
            bytemuck::pod_read_unaligned::<u32>(&bytes[..4])
        };
        self.readback.unmap();
        Ok(value)
    }
}
