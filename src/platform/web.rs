//! Browser platform
//!
//! Canvas 2D drawing, `<img>` based image loading, and the keyboard and
//! `requestAnimationFrame` wiring that drives a [`GameLoop`]. Dropping the
//! [`WebRunner`] cancels the pending frame and detaches the key listeners.

use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, KeyboardEvent, Window};

use crate::error::GameError;
use crate::game_loop::{Game, GameLoop};
use crate::input::Key;
use crate::renderer::{Color, Surface};
use crate::resources::{Completion, Fetch};
use crate::sprites::SpriteRegion;

fn unavailable(reason: impl Into<String>) -> GameError {
    GameError::SurfaceUnavailable(reason.into())
}

/// Canvas element plus its 2D context
pub struct CanvasSurface {
    window: Window,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    dpr: f64,
}

impl CanvasSurface {
    /// Find `<canvas id=..>` and get its 2D context. Without either the game
    /// cannot run.
    pub fn from_element_id(id: &str) -> Result<Self, GameError> {
        let window = web_sys::window().ok_or_else(|| unavailable("no window"))?;
        let document = window.document().ok_or_else(|| unavailable("no document"))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(id)
            .ok_or_else(|| unavailable(format!("no element #{id}")))?
            .dyn_into()
            .map_err(|_| unavailable(format!("#{id} is not a canvas")))?;

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|err| unavailable(format!("getContext failed: {err:?}")))?
            .ok_or_else(|| unavailable("no 2d context"))?
            .dyn_into()
            .map_err(|_| unavailable("unexpected context type"))?;

        let mut surface = Self {
            window,
            canvas,
            ctx,
            dpr: 1.0,
        };
        surface.sync_size();
        Ok(surface)
    }

    /// Match the backing store to the displayed size times the device pixel
    /// ratio and scale drawing so callers work in CSS pixels
    pub fn sync_size(&mut self) {
        self.dpr = self.window.device_pixel_ratio();
        let width = (self.canvas.client_width() as f64 * self.dpr).round() as u32;
        let height = (self.canvas.client_height() as f64 * self.dpr).round() as u32;

        if self.canvas.width() != width || self.canvas.height() != height {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            log::debug!("Canvas backing store {}x{}", width, height);
        }

        if let Err(err) = self.ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0) {
            log::warn!("setTransform failed: {:?}", err);
        }
    }
}

impl Surface for CanvasSurface {
    type Image = HtmlImageElement;

    fn width(&self) -> f32 {
        self.canvas.width() as f32
    }

    fn height(&self) -> f32 {
        self.canvas.height() as f32
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.dpr as f32
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.ctx
            .clear_rect(x as f64, y as f64, width as f64, height as f64);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .fill_rect(x as f64, y as f64, width as f64, height as f64);
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        if self
            .ctx
            .arc(x as f64, y as f64, radius as f64, 0.0, TAU)
            .is_ok()
        {
            self.ctx.fill();
        }
    }

    fn draw_image_region(
        &mut self,
        image: &HtmlImageElement,
        src: &SpriteRegion,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) {
        let drawn = self
            .ctx
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                src.x as f64,
                src.y as f64,
                src.width as f64,
                src.height as f64,
                x as f64,
                y as f64,
                width as f64,
                height as f64,
            );
        if let Err(err) = drawn {
            log::debug!("drawImage {:?} failed: {:?}", src.name, err);
        }
    }
}

/// Loads images through `<img>` elements
pub struct HtmlImageFetcher;

impl Fetch<HtmlImageElement> for HtmlImageFetcher {
    fn fetch(&self, url: &str, completion: Completion<HtmlImageElement>) {
        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(err) => {
                completion.reject(format!("cannot create image element: {err:?}"));
                return;
            }
        };

        // only one of onload/onerror settles the load
        let slot = Rc::new(RefCell::new(Some(completion)));

        let onload = {
            let slot = slot.clone();
            let loaded = image.clone();
            Closure::once_into_js(move || {
                loaded.set_onload(None);
                loaded.set_onerror(None);
                let completion = slot.borrow_mut().take();
                if let Some(completion) = completion {
                    completion.resolve(loaded);
                }
            })
        };

        let onerror = {
            let failed = image.clone();
            let url = url.to_string();
            Closure::once_into_js(move || {
                failed.set_onload(None);
                failed.set_onerror(None);
                let completion = slot.borrow_mut().take();
                if let Some(completion) = completion {
                    completion.reject(format!("failed to load image from {url}"));
                }
            })
        };

        image.set_onload(Some(onload.unchecked_ref::<js_sys::Function>()));
        image.set_onerror(Some(onerror.unchecked_ref::<js_sys::Function>()));
        image.set_src(url);
    }
}

type KeyListener = Closure<dyn FnMut(KeyboardEvent)>;

struct RunnerState<G: Game<Surface = CanvasSurface>> {
    window: Window,
    game_loop: RefCell<GameLoop<G>>,
    surface: RefCell<CanvasSurface>,
    frame_id: Cell<Option<i32>>,
    frame_callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    key_listeners: RefCell<Vec<(&'static str, KeyListener)>>,
}

impl<G: Game<Surface = CanvasSurface>> RunnerState<G> {
    fn frame(&self, timestamp_ms: f64) {
        self.frame_id.set(None);
        {
            let mut surface = self.surface.borrow_mut();
            surface.sync_size();
            self.game_loop.borrow_mut().frame(timestamp_ms, &mut surface);
        }
        self.request_frame();
    }

    fn request_frame(&self) {
        let callback = self.frame_callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return;
        };
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(id) => self.frame_id.set(Some(id)),
            Err(err) => log::error!("requestAnimationFrame failed: {:?}", err),
        }
    }

    fn key_event(&self, event: &KeyboardEvent, down: bool) {
        let Some(key) = Key::from_dom_key(&event.key()) else {
            return;
        };
        event.prevent_default();
        // auto-repeat of a held key carries no new press
        if down && event.repeat() {
            return;
        }

        let Ok(mut game_loop) = self.game_loop.try_borrow_mut() else {
            log::warn!("Dropped key event during a frame");
            return;
        };
        if down {
            game_loop.key_down(key);
        } else {
            game_loop.key_up(key);
        }
    }
}

/// Owns the running game; dropping it stops the game
pub struct WebRunner<G: Game<Surface = CanvasSurface> + 'static> {
    state: Rc<RunnerState<G>>,
}

impl<G: Game<Surface = CanvasSurface> + 'static> WebRunner<G> {
    /// Attach key listeners to the window and schedule the first frame
    pub fn start(game_loop: GameLoop<G>, surface: CanvasSurface) -> Result<Self, GameError> {
        let window = web_sys::window().ok_or_else(|| unavailable("no window"))?;

        let state = Rc::new(RunnerState {
            window: window.clone(),
            game_loop: RefCell::new(game_loop),
            surface: RefCell::new(surface),
            frame_id: Cell::new(None),
            frame_callback: RefCell::new(None),
            key_listeners: RefCell::new(Vec::new()),
        });
        // callbacks hold weak references so dropping the runner frees everything
        let runner = Self {
            state: state.clone(),
        };

        for (event_name, down) in [("keydown", true), ("keyup", false)] {
            let weak: Weak<RunnerState<G>> = Rc::downgrade(&state);
            let listener = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(state) = weak.upgrade() {
                    state.key_event(&event, down);
                }
            });
            window
                .add_event_listener_with_callback(event_name, listener.as_ref().unchecked_ref())
                .map_err(|err| unavailable(format!("cannot listen for {event_name}: {err:?}")))?;
            state.key_listeners.borrow_mut().push((event_name, listener));
        }

        let weak = Rc::downgrade(&state);
        let callback = Closure::<dyn FnMut(f64)>::new(move |timestamp_ms: f64| {
            if let Some(state) = weak.upgrade() {
                state.frame(timestamp_ms);
            }
        });
        *state.frame_callback.borrow_mut() = Some(callback);
        state.request_frame();

        log::info!("Web runner started");
        Ok(runner)
    }
}

impl<G: Game<Surface = CanvasSurface> + 'static> Drop for WebRunner<G> {
    fn drop(&mut self) {
        if let Some(id) = self.state.frame_id.take() {
            if let Err(err) = self.state.window.cancel_animation_frame(id) {
                log::warn!("cancelAnimationFrame failed: {:?}", err);
            }
        }

        for (event_name, listener) in self.state.key_listeners.borrow_mut().drain(..) {
            if let Err(err) = self
                .state
                .window
                .remove_event_listener_with_callback(event_name, listener.as_ref().unchecked_ref())
            {
                log::warn!("Cannot detach {} listener: {:?}", event_name, err);
            }
        }

        self.state.frame_callback.borrow_mut().take();
        log::info!("Web runner stopped");
    }
}
