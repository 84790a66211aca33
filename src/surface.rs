//! The game surface
//!
//! Owns the scene: one bouncing ball in a fixed playfield, the tick cue and
//! the two images. Everything outside talks to it through the operations
//! below; the host drives it through `SceneHooks`.

use glam::Vec2;

use crate::assets::{AssetCache, ImageData, Loader};
use crate::audio::{CueState, SoundCue};
use crate::consts::*;
use crate::physics::{Body, Bounds};
use crate::scene::SceneHooks;
use crate::settings::Settings;

/// Lifecycle of the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    /// Waiting for `create`
    Uninitialized,
    /// Scene built; `paused` suspends the physics loop
    Ready { paused: bool },
    /// Torn down (terminal)
    Destroyed,
}

/// The renderable scene and its ball
pub struct GameSurface {
    settings: Settings,
    state: SurfaceState,
    bounds: Bounds,
    ball: Body,
    cue: SoundCue,
    background: Option<ImageData>,
    ball_image: Option<ImageData>,
    failed_assets: Vec<String>,
}

impl GameSurface {
    pub fn new(settings: Settings) -> Self {
        let bounds = Bounds::playfield();
        Self {
            settings,
            state: SurfaceState::Uninitialized,
            bounds,
            ball: Body::new(bounds.center(), BALL_RADIUS),
            cue: SoundCue::missing(TICK_CUE),
            background: None,
            ball_image: None,
            failed_assets: Vec::new(),
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, SurfaceState::Ready { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, SurfaceState::Ready { paused: true })
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == SurfaceState::Destroyed
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn ball(&self) -> &Body {
        &self.ball
    }

    pub fn entity_velocity(&self) -> Vec2 {
        self.ball.vel
    }

    pub fn cue_state(&self) -> CueState {
        self.cue.state()
    }

    pub fn background_image(&self) -> Option<&ImageData> {
        self.background.as_ref()
    }

    pub fn ball_image(&self) -> Option<&ImageData> {
        self.ball_image.as_ref()
    }

    /// Keys of assets that failed to load
    pub fn failed_assets(&self) -> &[String] {
        &self.failed_assets
    }

    /// Set the ball's velocity immediately
    pub fn set_entity_velocity(&mut self, vel: Vec2) {
        if !self.is_ready() {
            log::debug!("set_entity_velocity ignored ({:?})", self.state);
            return;
        }
        self.ball.set_velocity(vel);
    }

    /// Zero the ball's velocity
    pub fn stop_entity(&mut self) {
        self.set_entity_velocity(Vec2::ZERO);
    }

    /// Suspend the physics loop. Audio is unaffected.
    pub fn pause(&mut self) {
        if let SurfaceState::Ready { paused } = &mut self.state {
            *paused = true;
        } else {
            log::debug!("pause ignored ({:?})", self.state);
        }
    }

    /// Resume the physics loop
    pub fn resume(&mut self) {
        if let SurfaceState::Ready { paused } = &mut self.state {
            *paused = false;
        } else {
            log::debug!("resume ignored ({:?})", self.state);
        }
    }

    /// Play the tick cue
    pub fn play_cue(&mut self, looped: bool, volume: f32) {
        if !self.is_ready() {
            log::debug!("play_cue ignored ({:?})", self.state);
            return;
        }
        let volume = self.settings.cue_volume(volume);
        self.cue.play(looped, volume);
    }

    /// Stop the tick cue; a no-op when it is not playing
    pub fn stop_cue(&mut self) {
        self.cue.stop();
    }

    /// Release everything. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.cue.release();
        self.ball.stop();
        self.background = None;
        self.ball_image = None;
        self.state = SurfaceState::Destroyed;
        log::info!("Game surface destroyed");
    }
}

impl SceneHooks for GameSurface {
    fn preload(&mut self, loader: &mut Loader) {
        let paths = &self.settings.assets;
        loader.audio(TICK_CUE, &paths.tick_cue);
        loader.image(BALL_IMAGE, &paths.ball);
        loader.image(BACKGROUND_IMAGE, &paths.background);
        loader.set_timeout(self.settings.asset_timeout_secs());

        loader.on_file_complete(|key, kind| {
            log::info!("File complete: {}, Type: {}", key, kind);
        });
        loader.on_file_error(|error| {
            log::error!("Failed to load file: {} ({})", error.key(), error);
        });
        loader.on_load_error(|error| {
            log::error!("Failed to process file: {} ({})", error.key(), error);
        });
    }

    fn create(&mut self, mut assets: AssetCache) {
        if self.state != SurfaceState::Uninitialized {
            log::warn!("create called on a {:?} surface", self.state);
            return;
        }

        self.failed_assets = assets
            .failures()
            .iter()
            .map(|e| e.key().to_string())
            .collect();

        self.background = assets.take_image(BACKGROUND_IMAGE);
        self.ball_image = assets.take_image(BALL_IMAGE);

        let radius = self
            .ball_image
            .as_ref()
            .filter(|img| img.width > 0)
            .map(|img| img.width as f32 / 2.0)
            .unwrap_or(BALL_RADIUS);
        self.ball = Body::new(self.bounds.center(), radius);

        self.cue = match assets.take_audio(TICK_CUE) {
            Some(sink) => {
                log::info!("Tick sound initialized successfully");
                SoundCue::loaded(TICK_CUE, sink)
            }
            None => {
                log::error!("Tick sound unavailable; sessions will run silently");
                SoundCue::missing(TICK_CUE)
            }
        };

        self.state = SurfaceState::Ready { paused: false };
        log::info!(
            "Game surface ready ({}x{}, {} asset(s) missing)",
            self.bounds.size().x,
            self.bounds.size().y,
            self.failed_assets.len()
        );
    }

    fn update(&mut self, dt: f32) {
        if self.state != (SurfaceState::Ready { paused: false }) {
            return;
        }
        self.ball.step(dt, &self.bounds);
    }

    fn is_paused(&self) -> bool {
        GameSurface::is_paused(self)
    }

    fn destroy(&mut self) {
        self.teardown();
    }
}
