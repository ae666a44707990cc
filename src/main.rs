use anyhow::Context;
use winit::{
    event::*,
    event_loop::EventLoop,
    window::Window,
};
use std::sync::Arc;

// Import from the library crate
use aviator::{
    config::AviatorConfig,
    controller::{clock::InstantClock, Animator, Clock, FrameStats, InputEvent, InputTracker},
    logging,
    model::{aviator::default_seed, AviatorScene, Camera},
    view::{GpuContext, RenderState},
};

struct App {
    gpu: GpuContext,
    window: Arc<Window>,
    render_state: RenderState,
    camera: Camera,
    scene: AviatorScene,
    input: InputTracker,
    animator: Animator,
    clock: InstantClock,
    stats: FrameStats,
}

impl App {
    async fn new(window: Arc<Window>, config: &AviatorConfig, seed: u64) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let gpu = GpuContext::new_native(window.clone(), size.width, size.height)
            .await
            .context("failed to initialize the GPU")?;

        let scene = AviatorScene::new(&config.scene, seed);
        let camera = Camera::new(&config.scene.camera, gpu.config.width, gpu.config.height);
        let render_state = RenderState::new(&gpu.device, &gpu.config, &scene);
        let animator = Animator::new(config).context("invalid flight configuration")?;

        Ok(Self {
            gpu,
            window,
            render_state,
            camera,
            scene,
            input: InputTracker::new(),
            animator,
            clock: InstantClock::start(),
            stats: FrameStats::new(),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if self.render_state.resize(&self.gpu.device, &self.gpu.surface, new_size.width, new_size.height) {
            self.camera.set_aspect(new_size.width, new_size.height);
        }
    }

    /// Returns true when the event was consumed as input
    fn input(&mut self, event: &WindowEvent) -> bool {
        let event = match event {
            WindowEvent::CursorMoved { position, .. } => {
                let size = self.window.inner_size();
                InputEvent::PointerMoved {
                    client_x: position.x as f32,
                    client_y: position.y as f32,
                    width: size.width as f32,
                    height: size.height as f32,
                }
            }
            WindowEvent::Focused(false) => InputEvent::FocusLost,
            _ => return false,
        };
        self.input.process_event(&event);
        true
    }

    fn update(&mut self) {
        let elapsed = self.clock.elapsed_time();
        self.animator.tick(&mut self.scene, self.input.pointer(), elapsed);

        if let Some(fps) = self.stats.record(elapsed) {
            tracing::debug!(fps, frames = self.animator.frames(), "frame rate");
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.render_state.draw_frame(
            &self.gpu.device,
            &self.gpu.queue,
            &self.gpu.surface,
            &self.camera,
            &self.scene,
        )
    }
}

/// Scene seed from `AVIATOR_SEED`, or a time-based one
fn scene_seed() -> anyhow::Result<u64> {
    match std::env::var("AVIATOR_SEED") {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("AVIATOR_SEED must be an unsigned integer, got {raw:?}")),
        Err(_) => Ok(default_seed()),
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let config = AviatorConfig::default();
    let seed = scene_seed()?;

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window_attributes = Window::default_attributes()
        .with_title("Aviator")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    #[allow(deprecated)]
    let window = event_loop.create_window(window_attributes).context("failed to create window")?;
    let window = Arc::new(window);

    let mut app = pollster::block_on(App::new(window.clone(), &config, seed))?;

    #[allow(deprecated)]
    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            app.update();

                            match app.render() {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    tracing::error!("GPU out of memory, exiting");
                                    elwt.exit();
                                }
                                Err(e) => tracing::warn!(error = %e, "frame dropped"),
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
