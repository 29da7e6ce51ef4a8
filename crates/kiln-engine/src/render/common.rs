//! Shared GPU types and utilities used by the renderers.

use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::scene::Camera;

// ── blend ─────────────────────────────────────────────────────────────────

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

// ── view uniform ──────────────────────────────────────────────────────────

/// Maps view-space positions to NDC: `origin` lands on the bottom-left
/// (or top-left when `y_down`) corner and `origin + extent` on the opposite one.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ViewUniform {
    origin: [f32; 2],
    extent: [f32; 2],
    y_down: f32,
    _pad: [f32; 3], // 16-byte alignment
}

impl ViewUniform {
    /// World space as seen by `camera` (+Y up).
    pub fn world(camera: &Camera) -> Self {
        let extent = camera.view_extent();
        Self {
            origin: [camera.position.x, camera.position.y],
            extent: [extent.x.max(f32::EPSILON), extent.y.max(f32::EPSILON)],
            y_down: 0.0,
            _pad: [0.0; 3],
        }
    }

    /// Pixel space of a `width x height` target (+Y down).
    pub fn screen(width: f32, height: f32) -> Self {
        Self {
            origin: [0.0, 0.0],
            extent: [width.max(1.0), height.max(1.0)],
            y_down: 1.0,
            _pad: [0.0; 3],
        }
    }

    /// Same mapping the vertex shaders apply.
    pub fn to_ndc(&self, p: Vec2) -> Vec2 {
        let x = (p.x - self.origin[0]) / self.extent[0] * 2.0 - 1.0;
        let y = (p.y - self.origin[1]) / self.extent[1] * 2.0 - 1.0;
        if self.y_down > 0.5 { Vec2::new(x, -y) } else { Vec2::new(x, y) }
    }
}

/// Minimum binding size of the view uniform buffer.
pub(super) fn view_ubo_min_binding_size() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<ViewUniform>() as u64)
}

// ── quad vertex ───────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct QuadVertex {
    pub pos: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub(super) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

pub(super) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_uniform_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<ViewUniform>(), 32);
    }

    #[test]
    fn world_view_maps_camera_corners_to_ndc_corners() {
        let cam = Camera::new(Vec2::new(100.0, 20.0));
        let view = ViewUniform::world(&cam);
        assert_eq!(view.to_ndc(cam.position), Vec2::new(-1.0, -1.0));
        assert_eq!(view.to_ndc(cam.position + cam.view_extent()), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn screen_view_puts_origin_top_left() {
        let view = ViewUniform::screen(800.0, 600.0);
        assert_eq!(view.to_ndc(Vec2::zero()), Vec2::new(-1.0, 1.0));
        assert_eq!(view.to_ndc(Vec2::new(800.0, 600.0)), Vec2::new(1.0, -1.0));
    }
}
