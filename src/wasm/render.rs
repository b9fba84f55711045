use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Event, EventTarget, HtmlCanvasElement, MediaStream};

use super::camera;
use super::webgl::{WebGl2Gpu, WebVideo};
use crate::config::Config;
use crate::driver::FrameClock;
use crate::input::{CameraState, Tap, TapTracker};
use crate::renderer::FrameRenderer;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

fn listen(
    target: &EventTarget,
    event: &'static str,
    f: impl FnMut(Event) + 'static,
) -> Result<Listener, JsValue> {
    let callback = Closure::wrap(Box::new(f) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
    Ok(Listener {
        target: target.clone(),
        event,
        callback,
    })
}

struct State {
    canvas: HtmlCanvasElement,
    config: Config,
    renderer: FrameRenderer<WebGl2Gpu>,
    video: WebVideo,
    clock: FrameClock,
    taps: TapTracker,
    camera: CameraState,
    stream: Option<MediaStream>,
    track_ended: Option<Closure<dyn FnMut(Event)>>,
    pending_frame: Option<i32>,
}

/// A mounted canvas: owns the renderer, the camera element and the
/// requestAnimationFrame loop.
#[wasm_bindgen]
pub struct Viewer {
    state: Rc<RefCell<State>>,
    frame: FrameCallback,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl Viewer {
    /// Set up WebGL2 and the pipeline on `<canvas id=canvas_id>`. Reads an
    /// optional JSON config from the canvas's `data-config` attribute.
    pub fn mount(canvas_id: &str) -> Result<Viewer, JsValue> {
        let win = window().ok_or("no window")?;
        let document = win.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        let config = match canvas.get_attribute("data-config") {
            Some(json) => Config::from_json(&json)?,
            None => Config::default(),
        };

        fit_canvas(&canvas);
        let gpu = WebGl2Gpu::from_canvas(&canvas).map_err(|e| {
            log::error!("{e}");
            e
        })?;
        let renderer = FrameRenderer::new(gpu, config.clone(), (canvas.width(), canvas.height()))?;
        let video = WebVideo::new(camera::create_video_element()?);

        let state = Rc::new(RefCell::new(State {
            canvas: canvas.clone(),
            taps: TapTracker::new(config.double_tap_ms),
            config,
            renderer,
            video,
            clock: FrameClock::new(),
            camera: CameraState::Idle,
            stream: None,
            track_ended: None,
            pending_frame: None,
        }));

        // Animation loop
        // `frame` holds the animation-frame closure so that it can keep
        // calling `request_animation_frame` on itself.
        let frame: FrameCallback = Rc::new(RefCell::new(None));
        {
            let state = state.clone();
            let next = frame.clone();
            *frame.borrow_mut() = Some(Closure::wrap(Box::new(move |now_ms: f64| {
                let mut s = state.borrow_mut();
                s.pending_frame = None;
                if !s.clock.is_running() {
                    return;
                }
                let dt = s.clock.tick(now_ms);
                let size = (s.canvas.width(), s.canvas.height());
                let State { renderer, video, .. } = &mut *s;
                if let Err(e) = renderer.tick(dt, video, size) {
                    if s.clock.halt_on(&e) {
                        log::error!("render loop halted: {e}");
                        return;
                    }
                    log::warn!("frame dropped: {e}");
                }
                s.pending_frame = schedule(&next);
            }) as Box<dyn FnMut(f64)>));
        }

        let mut listeners = Vec::new();

        // Resize canvas to fit its CSS box
        {
            let canvas = canvas.clone();
            listeners.push(listen(&win, "resize", move |_| fit_canvas(&canvas))?);
        }

        // Tap starts the camera, double tap toggles fullscreen
        {
            let state = state.clone();
            listeners.push(listen(&canvas, "click", move |ev: Event| {
                let tap = state.borrow_mut().taps.register(ev.time_stamp());
                match tap {
                    Tap::Single => request_camera(&state),
                    Tap::Double => {
                        let canvas = state.borrow().canvas.clone();
                        toggle_fullscreen(&canvas);
                    }
                }
            })?);
        }

        Ok(Viewer {
            state,
            frame,
            listeners,
        })
    }

    pub fn start(&self) {
        let mut s = self.state.borrow_mut();
        if s.clock.start() {
            log::debug!("render loop started");
            s.pending_frame = schedule(&self.frame);
        }
    }

    pub fn stop(&self) {
        let mut s = self.state.borrow_mut();
        if s.clock.stop() {
            log::debug!("render loop stopped");
            if let (Some(id), Some(win)) = (s.pending_frame.take(), window()) {
                win.cancel_animation_frame(id).ok();
            }
        }
    }

    pub fn start_camera(&self) {
        request_camera(&self.state);
    }

    pub fn toggle_fullscreen(&self) {
        let canvas = self.state.borrow().canvas.clone();
        toggle_fullscreen(&canvas);
    }

    /// Live-adjust the trail strength, 0 shows only the camera.
    pub fn set_feedback_mix(&self, mix: f32) -> Result<(), JsValue> {
        let mut s = self.state.borrow_mut();
        let mut params = s.renderer.config().feedback.clone();
        params.mix = mix;
        s.renderer.set_feedback(params)?;
        Ok(())
    }

    pub fn frames_rendered(&self) -> f64 {
        self.state.borrow().renderer.frames_rendered() as f64
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.stop();
        for l in self.listeners.drain(..) {
            l.target
                .remove_event_listener_with_callback(l.event, l.callback.as_ref().unchecked_ref())
                .ok();
        }
        // breaks the closure's reference cycle
        self.frame.borrow_mut().take();
        let mut s = self.state.borrow_mut();
        if let Some(stream) = s.stream.take() {
            camera::stop(&stream);
        }
        s.track_ended = None;
    }
}

fn schedule(frame: &FrameCallback) -> Option<i32> {
    let win = window()?;
    let cb = frame.borrow();
    win.request_animation_frame(cb.as_ref()?.as_ref().unchecked_ref())
        .ok()
}

fn request_camera(state: &Rc<RefCell<State>>) {
    let (element, constraints) = {
        let mut s = state.borrow_mut();
        if !s.camera.can_request() {
            return;
        }
        s.camera = CameraState::Requesting;
        (s.video.element().clone(), s.config.video.clone())
    };

    let state = state.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let res = camera::attach(&element, &constraints).await;
        let mut s = state.borrow_mut();
        match res {
            Ok(stream) => {
                let weak = Rc::downgrade(&state);
                s.track_ended = Some(camera::watch_ended(&stream, move |_| {
                    let Some(state) = weak.upgrade() else {
                        return;
                    };
                    let mut s = state.borrow_mut();
                    s.camera = s.camera.track_ended();
                    if let Some(stream) = s.stream.take() {
                        log::warn!("camera track ended");
                        camera::stop(&stream);
                    }
                }));
                s.camera = CameraState::Streaming;
                s.stream = Some(stream);
            }
            Err(e) => {
                log::error!("{e}");
                s.camera = CameraState::Failed;
            }
        }
    });
}

fn toggle_fullscreen(canvas: &HtmlCanvasElement) {
    let Some(document) = window().and_then(|w| w.document()) else {
        return;
    };
    let res = if document.fullscreen_element().is_some() {
        document.exit_fullscreen();
        Ok(())
    } else {
        canvas.request_fullscreen()
    };
    if let Err(e) = res {
        log::warn!("fullscreen request rejected: {e:?}");
    }
}

/// Match the drawing buffer to the canvas's displayed size in device pixels.
fn fit_canvas(canvas: &HtmlCanvasElement) {
    let Some(win) = window() else {
        return;
    };
    let dpr = win.device_pixel_ratio();
    let (mut w, mut h) = (canvas.client_width() as f64, canvas.client_height() as f64);
    if w <= 0.0 || h <= 0.0 {
        w = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
        h = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
    }
    let (pw, ph) = ((w * dpr).round().max(1.0) as u32, (h * dpr).round().max(1.0) as u32);
    if canvas.width() != pw || canvas.height() != ph {
        canvas.set_width(pw);
        canvas.set_height(ph);
        log::debug!("canvas resized to {pw}x{ph}");
    }
}
