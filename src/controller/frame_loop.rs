/// Counts frames and reports the rate about once per second
#[derive(Debug, Default)]
pub struct FrameStats {
    window_start: Option<f64>,
    frames: u32,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `now` seconds. Returns frames per second when a window closes.
    pub fn record(&mut self, now: f64) -> Option<f64> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            return None;
        };
        self.frames += 1;
        let span = now - start;
        if span < 1.0 {
            return None;
        }
        let fps = self.frames as f64 / span;
        self.window_start = Some(now);
        self.frames = 0;
        Some(fps)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{canvas_size, FrameLoopContext};

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use web_sys::{HtmlCanvasElement, Window};

    use super::FrameStats;
    use crate::controller::animator::Animator;
    use crate::controller::clock::{Clock, PerformanceClock};
    use crate::controller::input::{wasm::viewport_size, InputTracker};
    use crate::model::{AviatorScene, Camera};
    use crate::view::{GpuContext, RenderState};

    /// Drawing buffer size: the CSS viewport times the device pixel ratio, capped at 2
    pub fn canvas_size(window: &Window) -> (u32, u32) {
        let (width, height) = viewport_size(window);
        let ratio = window.device_pixel_ratio().min(2.0) as f32;
        ((width * ratio) as u32, (height * ratio) as u32)
    }

    /// Main loop state and update logic
    pub struct FrameLoopContext {
        pub gpu: GpuContext,
        pub render_state: RenderState,
        pub camera: Camera,
        pub scene: AviatorScene,
        pub input: Rc<RefCell<InputTracker>>,
        pub animator: Animator,
        pub clock: PerformanceClock,
        pub stats: FrameStats,
        pub canvas: HtmlCanvasElement,
    }

    impl FrameLoopContext {
        /// Advance the animation for one frame
        pub fn update(&mut self, window: &Window) {
            self.handle_resize(window);

            let elapsed = self.clock.elapsed_time();
            // Short borrow: listeners may write the pointer between frames
            let pointer = self.input.borrow().pointer();
            self.animator.tick(&mut self.scene, pointer, elapsed);

            if let Some(fps) = self.stats.record(elapsed) {
                tracing::debug!(fps, frames = self.animator.frames(), "frame rate");
            }
        }

        pub fn draw(&mut self) {
            if let Err(e) = self.render_state.draw_frame(
                &self.gpu.device,
                &self.gpu.queue,
                &self.gpu.surface,
                &self.camera,
                &self.scene,
            ) {
                tracing::error!(error = %e, "failed to draw frame");
            }
        }

        fn handle_resize(&mut self, window: &Window) {
            let (width, height) = canvas_size(window);
            if width == 0 || height == 0 {
                return;
            }
            if width == self.canvas.width() && height == self.canvas.height() {
                return;
            }
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            if self.render_state.resize(&self.gpu.device, &self.gpu.surface, width, height) {
                self.camera.set_aspect(width, height);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_opens_window() {
        let mut stats = FrameStats::new();
        assert_eq!(stats.record(5.0), None);
        assert_eq!(stats.record(5.5), None);
    }

    #[test]
    fn test_reports_once_per_second() {
        let mut stats = FrameStats::new();
        let mut reports = Vec::new();
        for k in 0..=120 {
            if let Some(fps) = stats.record(k as f64 / 60.0) {
                reports.push(fps);
            }
        }
        assert_eq!(reports.len(), 2);
        assert!((reports[0] - 60.0).abs() < 1e-9);
        assert!((reports[1] - 60.0).abs() < 1e-6);
    }
}
