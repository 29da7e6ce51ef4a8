use winit::dpi::LogicalSize;

use crate::assets::{DEFAULT_SHADER, PICKING_SHADER};
use crate::device::GpuInit;
use crate::paint::Color;
use crate::window::RuntimeConfig;

/// Engine-wide settings, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub title: String,
    /// Initial window size in logical pixels.
    pub window_size: (f64, f64),
    /// Frame buffer and picking surface resolution.
    pub render_width: u32,
    pub render_height: u32,
    /// Color-pass clear color.
    pub background: Color,
    /// Width over height of the letterboxed view.
    pub aspect: f32,
    pub input_queue_capacity: usize,
    pub default_shader: String,
    pub picking_shader: String,
    /// Scene index `GameEngineStopPlay` returns to.
    pub editor_scene: usize,
    /// Scene index `GameEngineStartPlay` switches to.
    pub play_scene: usize,
    pub vsync: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "Kiln".to_string(),
            window_size: (1600.0, 900.0),
            render_width: 3840,
            render_height: 2160,
            background: Color::WHITE,
            aspect: 16.0 / 9.0,
            input_queue_capacity: 256,
            default_shader: DEFAULT_SHADER.to_string(),
            picking_shader: PICKING_SHADER.to_string(),
            editor_scene: 0,
            play_scene: 1,
            vsync: true,
        }
    }
}

impl EngineConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_window_size(mut self, width: f64, height: f64) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Sets the render resolution; the letterbox aspect follows it.
    pub fn with_render_resolution(mut self, width: u32, height: u32) -> Self {
        self.render_width = width.max(1);
        self.render_height = height.max(1);
        self.aspect = self.render_width as f32 / self.render_height as f32;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub(crate) fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self.title.clone(),
            initial_size: LogicalSize::new(self.window_size.0, self.window_size.1),
            input_queue_capacity: self.input_queue_capacity,
        }
    }

    pub(crate) fn gpu_init(&self) -> GpuInit {
        GpuInit::default().with_vsync(self.vsync)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_render_at_4k_with_white_background() {
        let c = EngineConfig::default();
        assert_eq!((c.render_width, c.render_height), (3840, 2160));
        assert_eq!(c.background, Color::WHITE);
        assert!((c.aspect - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(c.input_queue_capacity, 256);
    }

    #[test]
    fn render_resolution_sets_aspect() {
        let c = EngineConfig::default().with_render_resolution(1024, 768);
        assert!((c.aspect - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn runtime_config_carries_title_and_queue_bound() {
        let rc = EngineConfig::default().with_title("level").runtime_config();
        assert_eq!(rc.title, "level");
        assert_eq!(rc.input_queue_capacity, 256);
    }

    #[test]
    fn vsync_off_disables_fifo() {
        let gpu = EngineConfig::default().with_vsync(false).gpu_init();
        assert_eq!(gpu.present_mode, wgpu::PresentMode::AutoNoVsync);
    }
}
