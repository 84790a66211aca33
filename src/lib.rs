//! Bounce Session - a bouncing ball with timed sessions
//!
//! Core modules:
//! - `session`: Countdown bookkeeping and the completed-session log
//! - `surface`: The game surface (scene, ball body, tick cue)
//! - `scene`: Lifecycle hooks and the host that drives them
//! - `renderer`: WebGPU rendering pipeline
//! - `hud`: Side panel text (session id, time left, completed sessions)
//! - `platform`: Browser/native backends (assets, timers, audio)
//! - `settings`: Tunable policy values

pub mod assets;
pub mod audio;
pub mod clock;
pub mod error;
pub mod hud;
pub mod physics;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod session;
pub mod settings;
pub mod surface;

pub use error::{AssetError, ConfigError, RenderError};
pub use session::{Session, SessionController, SessionLog};
pub use settings::Settings;
pub use surface::GameSurface;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (pixels)
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Default ball radius when the ball image is unavailable
    pub const BALL_RADIUS: f32 = 16.0;
    /// Restitution applied on edge contact (1 = perfectly elastic)
    pub const BALL_BOUNCE: f32 = 1.0;

    /// Shortest and longest session, in whole seconds
    pub const MIN_SESSION_SECS: u32 = 1;
    pub const MAX_SESSION_SECS: u32 = 50;

    /// Per-axis launch speed before the multiplier (pixels/s)
    pub const BASE_LAUNCH_SPEED: i32 = 200;
    pub const LAUNCH_SPEED_MULTIPLIER: f32 = 1.5;

    /// Countdown tick period
    pub const TICK_INTERVAL_MS: u32 = 1000;

    /// Cap on a single frame's delta time (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// How long preload waits on a file before giving up on it
    pub const ASSET_LOAD_TIMEOUT_MS: u32 = 10_000;

    /// Asset keys
    pub const TICK_CUE: &str = "tick";
    pub const BALL_IMAGE: &str = "ball";
    pub const BACKGROUND_IMAGE: &str = "background";
}
