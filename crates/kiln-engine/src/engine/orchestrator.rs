use anyhow::Result;

use crate::assets::ShaderHandle;
use crate::core::{App, AppControl, FrameCtx, InitCtx};
use crate::device::Gpu;
use crate::draw::DrawList;
use crate::paint::Color;
use crate::render::{
    BatchRenderer, FrameBuffer, PICK_FORMAT, PickingSurface, Presenter, RenderCtx, RenderTarget,
    ViewUniform,
};
use crate::scene::{SceneFactory, SceneInitializer};
use crate::window::Runtime;

use super::{DefaultOverlay, EngineConfig, EngineContext, Overlay, OverlayFrame};

/// GPU-side state, created in `on_init` and released in `on_exit`.
struct GpuResources {
    frame_buffer: FrameBuffer,
    picking: PickingSurface,
    presenter: Presenter,

    /// Shared by the picking and color passes; only its shader and blending change.
    scene_batch: BatchRenderer,
    overlay_batch: BatchRenderer,

    default_shader: ShaderHandle,
    picking_shader: ShaderHandle,

    scene_list: DrawList,
    overlay_list: DrawList,
}

/// The render/update loop: one `on_frame` per presented frame.
///
/// Each frame runs, in order: input drain, picking pass (plus readback while
/// the primary button is held), color pass (scene update then render, skipped
/// until a delta exists), overlay, present, delta measurement.
pub struct Engine {
    ctx: EngineContext,
    overlay: Box<dyn Overlay>,
    gpu: Option<GpuResources>,
}

impl Engine {
    pub fn new(ctx: EngineContext, overlay: Box<dyn Overlay>) -> Self {
        Self {
            ctx,
            overlay,
            gpu: None,
        }
    }

    #[inline]
    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    #[inline]
    pub fn context_mut(&mut self) -> &mut EngineContext {
        &mut self.ctx
    }

    fn title(&self) -> String {
        match self.ctx.scene() {
            Some(scene) => format!("{} - {}", self.ctx.config().title, scene.name()),
            None => self.ctx.config().title.clone(),
        }
    }
}

impl App for Engine {
    fn on_init(&mut self, init: &mut InitCtx<'_, '_>) -> Result<()> {
        let (width, height) = init.window.physical_size();
        self.ctx.set_window_size(width, height);

        let default_path = self.ctx.config().default_shader.clone();
        let picking_path = self.ctx.config().picking_shader.clone();
        let default_shader = self.ctx.resources_mut().shader(&default_path)?;
        let picking_shader = self.ctx.resources_mut().shader(&picking_path)?;

        let (rw, rh) = self.ctx.render_size();
        let device = init.gpu.device();
        let frame_buffer = FrameBuffer::new(device, rw, rh);
        let picking = PickingSurface::new(device, rw, rh);
        let presenter = Presenter::new(device, init.gpu.surface_format(), &frame_buffer);

        let mut overlay_batch = BatchRenderer::new("kiln overlay pass");
        overlay_batch.bind_shader(default_shader.clone());

        self.gpu = Some(GpuResources {
            frame_buffer,
            picking,
            presenter,
            scene_batch: BatchRenderer::new("kiln scene pass"),
            overlay_batch,
            default_shader,
            picking_shader,
            scene_list: DrawList::new(),
            overlay_list: DrawList::new(),
        });

        log::info!("engine initialized: render {rw}x{rh}, window {width}x{height}");

        self.ctx.start();
        init.runtime.set_title(self.title());
        Ok(())
    }

    fn on_frame(&mut self, frame: &mut FrameCtx<'_, '_>) -> AppControl {
        let scene_before = self.ctx.scenes().current_index();
        let Engine { ctx, overlay, gpu } = self;
        let Some(res) = gpu.as_mut() else {
            return AppControl::Exit;
        };

        // 1. input
        ctx.begin_frame(frame.input);

        // 2-3. picking pass, then blending back on
        picking_pass(frame.gpu, ctx, res);

        // 4. color pass
        color_pass(frame.gpu, ctx, res);

        // 5. overlay
        res.overlay_list.clear();
        if let Some(scene) = ctx.scene() {
            let mut ui = OverlayFrame {
                draw_list: &mut res.overlay_list,
                input: ctx.input(),
                input_frame: ctx.input_frame(),
                selected: ctx.selection(),
                window_size: ctx.window_size(),
                viewport: ctx.viewport(),
                events: ctx.events(),
            };
            overlay.update(ctx.dt(), scene, &mut ui);
        }

        // 6. present
        let viewport = ctx.viewport();
        let (ww, wh) = ctx.window_size();
        let resources = ctx.resources();
        let control = frame.present(|rctx, target| {
            res.presenter.draw(target, viewport);
            res.overlay_batch.render(
                rctx,
                target,
                &mut res.overlay_list,
                ViewUniform::screen(ww as f32, wh as f32),
                resources,
            );
        });

        // 7. delta for the next frame, then deferred scene requests
        ctx.end_frame();

        if self.ctx.scenes().current_index() != scene_before {
            frame.runtime.set_title(self.title());
        }
        control
    }

    fn on_exit(&mut self) {
        self.ctx.shutdown();
        self.gpu = None;
        log::info!("engine stopped");
    }
}

/// Renders object ids into the picking surface and resolves the pointer's texel.
fn picking_pass(gpu: &Gpu<'_>, ctx: &mut EngineContext, res: &mut GpuResources) {
    res.scene_batch.set_blending(false);
    res.scene_batch.bind_shader(res.picking_shader.clone());

    let mut encoder = gpu.create_encoder("kiln picking encoder");
    {
        let mut target = RenderTarget::new(&mut encoder, res.picking.view());
        target.clear(wgpu::Color::TRANSPARENT);

        res.scene_list.clear();
        if let Some(scene) = ctx.scene() {
            scene.render(&mut res.scene_list);
            let rctx = RenderCtx::new(gpu.device(), gpu.queue(), PICK_FORMAT);
            res.scene_batch.render(
                &rctx,
                &mut target,
                &mut res.scene_list,
                ViewUniform::world(scene.camera()),
                ctx.resources(),
            );
        }
    }
    gpu.submit_encoder(encoder);

    res.scene_batch.set_blending(true);

    if let Some((x, y)) = ctx.pick_target_pixel() {
        match res.picking.read_pixel(gpu, x, y) {
            Ok(raw) => {
                ctx.resolve_pick(raw);
            }
            Err(e) => log::warn!("pick readback failed: {e:#}"),
        }
    }
}

/// Clears the frame buffer, advances the scene and renders it in color.
fn color_pass(gpu: &Gpu<'_>, ctx: &mut EngineContext, res: &mut GpuResources) {
    let mut encoder = gpu.create_encoder("kiln color encoder");
    {
        let mut target = RenderTarget::new(&mut encoder, res.frame_buffer.view());
        target.clear(ctx.background().to_wgpu());

        if ctx.dt().is_some() {
            ctx.advance();
            res.scene_list.clear();
            if let Some(scene) = ctx.scene() {
                scene.render(&mut res.scene_list);
                res.scene_batch.bind_shader(res.default_shader.clone());
                let rctx = RenderCtx::new(gpu.device(), gpu.queue(), FrameBuffer::FORMAT);
                res.scene_batch.render(
                    &rctx,
                    &mut target,
                    &mut res.scene_list,
                    ViewUniform::world(scene.camera()),
                    ctx.resources(),
                );
            }
        }
    }
    gpu.submit_encoder(encoder);
}

/// Assembles an `Engine` from scenes and an overlay, and runs it.
pub struct EngineBuilder {
    config: EngineConfig,
    scenes: Vec<SceneFactory>,
    overlay: Option<Box<dyn Overlay>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            scenes: Vec::new(),
            overlay: None,
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config = self.config.with_title(title);
        self
    }

    pub fn window_size(mut self, width: f64, height: f64) -> Self {
        self.config = self.config.with_window_size(width, height);
        self
    }

    pub fn render_resolution(mut self, width: u32, height: u32) -> Self {
        self.config = self.config.with_render_resolution(width, height);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.config = self.config.with_background(color);
        self
    }

    /// Adds a scene under the next index; the first one is started at launch.
    pub fn scene<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn SceneInitializer> + 'static,
    {
        self.scenes.push(Box::new(factory));
        self
    }

    pub fn overlay(mut self, overlay: impl Overlay + 'static) -> Self {
        self.overlay = Some(Box::new(overlay));
        self
    }

    pub fn build(self) -> Result<Engine> {
        anyhow::ensure!(!self.scenes.is_empty(), "engine needs at least one scene");

        let mut ctx = EngineContext::new(self.config);
        for factory in self.scenes {
            ctx.register_scene(factory);
        }
        let overlay: Box<dyn Overlay> = match self.overlay {
            Some(overlay) => overlay,
            None => Box::new(DefaultOverlay),
        };
        Ok(Engine::new(ctx, overlay))
    }

    /// Opens the window and runs until it closes.
    pub fn run(self) -> Result<()> {
        let runtime_config = self.config.runtime_config();
        let gpu_init = self.config.gpu_init();
        let engine = self.build()?;
        Runtime::run(runtime_config, gpu_init, engine)
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
