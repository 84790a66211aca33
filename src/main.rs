//! Bounce Session entry point
//!
//! In the browser this mounts the game, wires the start button and runs the
//! frame loop. Natively it plays one session headlessly in simulated time.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use bounce_session::GameSurface;
    use bounce_session::hud::{DomHud, START_BUTTON_ELEMENT};
    use bounce_session::platform::lifecycle::Mount;
    use bounce_session::platform::web::{IntervalTicker, WebAssetBackend};
    use bounce_session::renderer::BounceRenderState;
    use bounce_session::scene::SceneRunner;
    use bounce_session::session::{SessionController, TimerHandle};
    use bounce_session::settings::Settings;

    /// Everything the page's callbacks share
    struct App {
        runner: SceneRunner<GameSurface>,
        controller: SessionController,
        ticker: IntervalTicker,
        renderer: Option<BounceRenderState>,
        hud: DomHud,
        textures_uploaded: bool,
        last_time: f64,
        mount: Mount,
    }

    impl App {
        fn start_session(&mut self) {
            if !self.mount.is_mounted() {
                return;
            }
            self.controller
                .start_session(self.runner.scene_mut(), &mut self.ticker);
            self.hud.sync(&self.controller);
        }

        fn tick(&mut self, handle: TimerHandle) {
            if !self.mount.is_mounted() {
                return;
            }
            self.controller
                .on_tick(handle, self.runner.scene_mut(), &mut self.ticker);
            self.hud.sync(&self.controller);
        }

        /// Run one animation frame. Returns false once torn down.
        fn frame(&mut self, time: f64) -> bool {
            if !self.mount.is_mounted() {
                return false;
            }

            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            self.last_time = time;

            if !self.runner.frame(dt) {
                return false;
            }
            self.render();
            self.hud.sync(&self.controller);
            true
        }

        fn render(&mut self) {
            let Some(render_state) = self.renderer.as_mut() else {
                return;
            };
            let scene = self.runner.scene();
            if !scene.is_ready() {
                return;
            }
            if !self.textures_uploaded {
                render_state.set_images(scene.background_image(), scene.ball_image());
                self.textures_uploaded = true;
            }
            match render_state.render(scene) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        fn install_renderer(&mut self, render_state: BounceRenderState) {
            match self.mount.admit(render_state) {
                Some(render_state) => self.renderer = Some(render_state),
                None => log::info!("Page unmounted before the renderer was ready"),
            }
        }

        /// Tear down unless the page is only entering the back/forward cache
        fn page_hide(&mut self, persisted: bool) {
            if self.mount.page_hide(persisted) {
                self.teardown();
            }
        }

        /// Stop the countdown, release the scene and the GPU
        fn teardown(&mut self) {
            self.controller.shutdown(&mut self.ticker);
            self.ticker.clear_all();
            self.runner.destroy();
            self.renderer = None;
            log::info!("Bounce Session unmounted");
        }
    }

    fn on_interval(app: &Weak<RefCell<App>>, handle: TimerHandle) {
        if let Some(app) = app.upgrade() {
            app.borrow_mut().tick(handle);
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Bounce Session starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        log::info!("Session seed: {}", seed);

        let app = Rc::new_cyclic(|weak: &Weak<RefCell<App>>| {
            let weak = weak.clone();
            RefCell::new(App {
                runner: SceneRunner::new(GameSurface::new(settings.clone())),
                controller: SessionController::new(seed, &settings),
                ticker: IntervalTicker::new(move |handle| on_interval(&weak, handle)),
                renderer: None,
                hud: DomHud::new(document.clone()),
                textures_uploaded: false,
                last_time: 0.0,
                mount: Mount::Mounted,
            })
        });

        app.borrow_mut().runner.boot(&mut WebAssetBackend::new());

        setup_start_button(&document, app.clone())?;
        setup_unmount(&window, app.clone())?;
        request_animation_frame(app.clone());

        // The HUD and countdown work without a GPU; only drawing is skipped
        match create_renderer(canvas, width, height).await {
            Ok(render_state) => app.borrow_mut().install_renderer(render_state),
            Err(e) => log::error!("Renderer unavailable: {}", e),
        }

        log::info!("Bounce Session running!");
        Ok(())
    }

    async fn create_renderer(
        canvas: HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Result<BounceRenderState, String> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
            .map_err(|e| e.to_string())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| e.to_string())?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        BounceRenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| e.to_string())
    }

    fn setup_start_button(
        document: &web_sys::Document,
        app: Rc<RefCell<App>>,
    ) -> Result<(), JsValue> {
        let Some(btn) = document.get_element_by_id(START_BUTTON_ELEMENT) else {
            log::warn!("No #{} button on the page", START_BUTTON_ELEMENT);
            return Ok(());
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            app.borrow_mut().start_session();
        });
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_unmount(window: &web_sys::Window, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PageTransitionEvent| {
            app.borrow_mut().page_hide(event.persisted());
        });
        window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        let keep_going = app.borrow_mut().frame(time);
        if keep_going {
            request_animation_frame(app);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_app::run().await {
        log::error!("Bounce Session failed to start: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Bounce Session (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use bounce_session::GameSurface;
    use bounce_session::clock::{Clock, ManualClock, SystemClock};
    use bounce_session::consts::MAX_FRAME_DT;
    use bounce_session::hud::HudModel;
    use bounce_session::platform::native::FsAssetBackend;
    use bounce_session::scene::SceneRunner;
    use bounce_session::session::{ManualTicker, SessionController, TickOutcome};
    use bounce_session::settings::Settings;

    const FRAMES_PER_SECOND: u32 = 60;

    /// Play one randomized session in simulated time
    pub fn run() {
        let settings = Settings::load();
        let now = SystemClock.now();
        let clock = ManualClock::new(now);
        let seed = now.as_millis() as u64;

        let mut runner = SceneRunner::new(GameSurface::new(settings.clone()));
        runner.boot(&mut FsAssetBackend::new("."));

        let mut controller = SessionController::with_clock(seed, &settings, clock.clone());
        let mut ticker = ManualTicker::new();

        if !controller.start_session(runner.scene_mut(), &mut ticker) {
            log::error!("Game surface never became ready");
            return;
        }

        let frame_dt = (1.0 / FRAMES_PER_SECOND as f32).min(MAX_FRAME_DT);
        let frame_ms = 1000.0 / FRAMES_PER_SECOND as f64;
        while controller.is_running() {
            for _ in 0..FRAMES_PER_SECOND {
                runner.frame(frame_dt);
                clock.advance(frame_ms);
                ticker.advance(frame_ms);
                while let Some(handle) = ticker.pop_due() {
                    match controller.on_tick(handle, runner.scene_mut(), &mut ticker) {
                        TickOutcome::Counting(left) => {
                            let ball = runner.scene().ball();
                            log::info!(
                                "{} seconds left, ball at ({:.0}, {:.0})",
                                left,
                                ball.pos.x,
                                ball.pos.y
                            );
                        }
                        TickOutcome::Completed | TickOutcome::Ignored => {}
                    }
                }
            }
        }

        let hud = HudModel::from_controller(&controller);
        println!("Session ID: {}", hud.session_id);
        println!("Time Left: {}", hud.time_left);
        println!("Completed Sessions:");
        for line in &hud.lines {
            println!("  {}", line);
        }

        runner.destroy();
    }
}
