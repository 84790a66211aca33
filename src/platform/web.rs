//! Browser backends
//!
//! Images load through `<img>` and are decoded by drawing them into an
//! offscreen 2D canvas. The tick cue is an `<audio>` element. Intervals run
//! on `window.setInterval`.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, Event, HtmlAudioElement, HtmlCanvasElement, HtmlImageElement,
};

use crate::assets::{AssetBackend, AssetKind, AssetRequest, ImageData, LoadReporter, LoadedAsset};
use crate::audio::CueSink;
use crate::error::AssetError;
use crate::session::{Ticker, TimerHandle};

fn js_reason(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Fetches assets with DOM elements
#[derive(Debug, Default)]
pub struct WebAssetBackend;

impl WebAssetBackend {
    pub fn new() -> Self {
        Self
    }

    fn fetch_image(&self, request: &AssetRequest, reporter: LoadReporter) -> Result<(), JsValue> {
        let img = HtmlImageElement::new()?;
        let settled = Rc::new(Cell::new(false));

        {
            let img_clone = img.clone();
            let reporter = reporter.clone();
            let settled = settled.clone();
            let key = request.key.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
                if settled.replace(true) {
                    return;
                }
                match decode_image(&img_clone) {
                    Ok(image) => reporter.complete(&key, LoadedAsset::Image(image)),
                    Err(e) => reporter.fail(AssetError::Decode {
                        key: key.clone(),
                        reason: js_reason(&e),
                    }),
                }
            });
            img.add_event_listener_with_callback("load", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let reporter = reporter.clone();
            let key = request.key.clone();
            let path = request.path.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
                if settled.replace(true) {
                    return;
                }
                reporter.fail(AssetError::Fetch {
                    key: key.clone(),
                    reason: format!("could not load {}", path),
                });
            });
            img.add_event_listener_with_callback("error", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        img.set_src(&request.path);
        Ok(())
    }

    fn fetch_audio(&self, request: &AssetRequest, reporter: LoadReporter) -> Result<(), JsValue> {
        let audio = HtmlAudioElement::new_with_src(&request.path)?;
        audio.set_preload("auto");
        let settled = Rc::new(Cell::new(false));

        {
            let audio_clone = audio.clone();
            let reporter = reporter.clone();
            let settled = settled.clone();
            let key = request.key.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
                if settled.replace(true) {
                    return;
                }
                let cue = HtmlAudioCue::new(audio_clone.clone());
                reporter.complete(&key, LoadedAsset::Audio(Box::new(cue)));
            });
            // Either event means the first frame is playable
            for event in ["canplaythrough", "loadeddata"] {
                audio.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
            }
            closure.forget();
        }

        {
            let key = request.key.clone();
            let path = request.path.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
                if settled.replace(true) {
                    return;
                }
                reporter.fail(AssetError::Fetch {
                    key: key.clone(),
                    reason: format!("could not load {}", path),
                });
            });
            audio.add_event_listener_with_callback("error", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        audio.load();
        Ok(())
    }
}

impl AssetBackend for WebAssetBackend {
    fn fetch(&mut self, request: &AssetRequest, reporter: LoadReporter) {
        let result = match request.kind {
            AssetKind::Image => self.fetch_image(request, reporter.clone()),
            AssetKind::Audio => self.fetch_audio(request, reporter.clone()),
        };
        if let Err(e) = result {
            reporter.fail(AssetError::Fetch {
                key: request.key.clone(),
                reason: js_reason(&e),
            });
        }
    }
}

/// Read back RGBA pixels. Fails for tainted (cross-origin) images.
fn decode_image(img: &HtmlImageElement) -> Result<ImageData, JsValue> {
    let (width, height) = (img.natural_width(), img.natural_height());
    if width == 0 || height == 0 {
        return Err(JsValue::from_str("image has no size"));
    }

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;
    ctx.draw_image_with_html_image_element(img, 0.0, 0.0)?;
    let pixels = ctx.get_image_data(0.0, 0.0, width as f64, height as f64)?;
    Ok(ImageData::new(width, height, pixels.data().0))
}

/// Tick cue backed by an `<audio>` element
#[derive(Debug)]
pub struct HtmlAudioCue {
    element: HtmlAudioElement,
}

impl HtmlAudioCue {
    pub fn new(element: HtmlAudioElement) -> Self {
        Self { element }
    }
}

impl CueSink for HtmlAudioCue {
    fn play(&mut self, looped: bool, volume: f32) {
        self.element.set_loop(looped);
        self.element.set_volume(volume as f64);
        match self.element.play() {
            Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                // Autoplay policy can reject this until the page has a user gesture
                if let Err(e) = JsFuture::from(promise).await {
                    log::warn!("Tick sound playback rejected: {}", js_reason(&e));
                }
            }),
            Err(e) => log::warn!("Tick sound playback failed: {}", js_reason(&e)),
        }
    }

    fn stop(&mut self) {
        if let Err(e) = self.element.pause() {
            log::warn!("Failed to pause tick sound: {}", js_reason(&e));
        }
        self.element.set_current_time(0.0);
    }
}

struct Interval {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

/// `setInterval`-backed ticker
///
/// Each firing calls `on_tick` with the interval's handle. Cleared callbacks
/// are kept until the next `start_interval`, since an interval can be
/// cleared from inside its own callback.
pub struct IntervalTicker {
    on_tick: Rc<dyn Fn(TimerHandle)>,
    next_id: u32,
    active: HashMap<TimerHandle, Interval>,
    retired: Vec<Interval>,
}

impl IntervalTicker {
    pub fn new(on_tick: impl Fn(TimerHandle) + 'static) -> Self {
        Self {
            on_tick: Rc::new(on_tick),
            next_id: 0,
            active: HashMap::new(),
            retired: Vec::new(),
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Cancel every interval
    pub fn clear_all(&mut self) {
        let handles: Vec<_> = self.active.keys().copied().collect();
        for handle in handles {
            self.clear_interval(handle);
        }
    }
}

impl Ticker for IntervalTicker {
    fn start_interval(&mut self, period_ms: u32) -> TimerHandle {
        self.retired.clear();
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);

        let on_tick = self.on_tick.clone();
        let callback = Closure::<dyn FnMut()>::new(move || on_tick(handle));
        let scheduled = web_sys::window()
            .ok_or_else(|| JsValue::from_str("no window"))
            .and_then(|w| {
                w.set_interval_with_callback_and_timeout_and_arguments_0(
                    callback.as_ref().unchecked_ref(),
                    period_ms.min(i32::MAX as u32) as i32,
                )
            });
        match scheduled {
            Ok(id) => {
                self.active.insert(
                    handle,
                    Interval {
                        id,
                        _callback: callback,
                    },
                );
            }
            Err(e) => log::error!("setInterval failed: {}", js_reason(&e)),
        }
        handle
    }

    fn clear_interval(&mut self, handle: TimerHandle) {
        if let Some(interval) = self.active.remove(&handle) {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(interval.id);
            }
            self.retired.push(interval);
        }
    }
}

impl Drop for IntervalTicker {
    fn drop(&mut self) {
        self.clear_all();
    }
}
