// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod math;
pub mod utils;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use error::{AviatorError, Result};

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        use std::cell::RefCell;
        use std::rc::Rc;

        use wasm_bindgen::closure::Closure;
        use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
        use web_sys::{Document, Event, HtmlCanvasElement, MouseEvent, Window};

        use config::AviatorConfig;
        use controller::clock::PerformanceClock;
        use controller::frame_loop::canvas_size;
        use controller::{Animator, FrameLoopContext, FrameStats, InputEvent, InputTracker};
        use model::{aviator::default_seed, AviatorScene, Camera};
        use view::{GpuContext, RenderState};
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> std::result::Result<(), JsValue> {
    logging::init();
    let (window, document, canvas) = init_canvas()?;
    setup_app(&window, &document, &canvas).await
}

/// Main application setup for WASM
#[cfg(target_arch = "wasm32")]
async fn setup_app(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
) -> std::result::Result<(), JsValue> {
    let config = AviatorConfig::default();

    // Initialize GPU
    let gpu = GpuContext::new(canvas, canvas.width(), canvas.height())
        .await
        .map_err(|e| js_error(format!("GPU init failed: {e}")))?;

    let width = gpu.config.width;
    let height = gpu.config.height;

    let scene = AviatorScene::new(&config.scene, default_seed());
    let camera = Camera::new(&config.scene.camera, width, height);
    let render_state = RenderState::new(gpu.device.as_ref(), &gpu.config, &scene);
    let animator = Animator::new(&config).map_err(|e| js_error(e.to_string()))?;

    let input = Rc::new(RefCell::new(InputTracker::new()));
    setup_input_listeners(document, window, input.clone())?;

    let mut frame_ctx = FrameLoopContext {
        gpu,
        render_state,
        camera,
        scene,
        input,
        animator,
        clock: PerformanceClock::start(window),
        stats: FrameStats::new(),
        canvas: canvas.clone(),
    };

    // Continuous redraw using requestAnimationFrame
    let f = RcCellCallback::new(window.clone(), {
        let window_for_loop = window.clone();

        move || {
            frame_ctx.update(&window_for_loop);
            frame_ctx.draw();
        }
    });
    f.start()
}

/// Setup pointer listeners with platform-agnostic abstractions
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &Document,
    window: &Window,
    input: Rc<RefCell<InputTracker>>,
) -> std::result::Result<(), JsValue> {
    // Mouse move
    {
        let input = input.clone();
        let window_for_size = window.clone();
        let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
            let event = controller::input::wasm::mouse_move_to_input(&e, &window_for_size);
            input.borrow_mut().process_event(&event);
        }) as Box<dyn FnMut(MouseEvent)>);
        document.add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())?;
        mm.forget();
    }

    // Focus loss
    {
        let input = input.clone();
        let blur = Closure::wrap(Box::new(move |_e: Event| {
            input.borrow_mut().process_event(&InputEvent::FocusLost);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
        blur.forget();
    }

    Ok(())
}

/// Full-window canvas sized to the viewport at the capped pixel ratio
#[cfg(target_arch = "wasm32")]
fn init_canvas() -> std::result::Result<(Window, Document, HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or(js_error("no global `window`"))?;
    let document = window.document().ok_or(js_error("no document on window"))?;
    let body = document.body().ok_or(js_error("no body on document"))?;
    body.set_attribute("style", "margin:0;overflow:hidden")?;

    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;
    canvas_el.set_attribute("style", "display:block;width:100vw;height:100vh")?;

    let (width, height) = canvas_size(&window);
    canvas_el.set_width(width.max(1));
    canvas_el.set_height(height.max(1));
    body.append_child(&canvas_el)?;
    Ok((window, document, canvas_el))
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}

#[cfg(target_arch = "wasm32")]
struct RcCellCallback {
    inner: Rc<RefCell<Box<dyn FnMut()>>>,
    window: Window,
}

#[cfg(target_arch = "wasm32")]
impl RcCellCallback {
    fn new(window: Window, f: impl FnMut() + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
        }
    }

    fn start(self) -> std::result::Result<(), JsValue> {
        let inner = self.inner.clone();
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            inner.borrow_mut().as_mut()();

            // Recursively schedule next frame
            if let Some(cb) = callback_clone.borrow().as_ref() {
                if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!(error = ?e, "requestAnimationFrame failed, animation stopped");
                }
            }
        }) as Box<dyn FnMut()>));

        if let Some(cb) = callback.borrow().as_ref() {
            self.window.request_animation_frame(cb.as_ref().unchecked_ref())?;
        }

        // Leak the closure to keep it alive
        std::mem::forget(callback);
        Ok(())
    }
}
