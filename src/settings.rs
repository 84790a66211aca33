//! Game settings
//!
//! Policy values for sessions and the surface. Defaults reproduce the stock
//! game; a page may override any subset with a JSON blob.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Where a named asset lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPaths {
    pub tick_cue: String,
    pub ball: String,
    pub background: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            tick_cue: "assets/clock.mp3".to_string(),
            ball: "assets/ball.png".to_string(),
            background: "assets/background.png".to_string(),
        }
    }
}

/// Game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Sessions ===
    /// Shortest session duration (seconds, inclusive)
    pub min_session_secs: u32,
    /// Longest session duration (seconds, inclusive)
    pub max_session_secs: u32,
    /// Countdown tick period (ms)
    pub tick_interval_ms: u32,

    // === Ball ===
    /// Per-axis launch speed range before the multiplier
    pub base_launch_speed: i32,
    /// Multiplier applied to the launch range
    pub launch_speed_multiplier: f32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Silence the tick cue entirely
    pub muted: bool,

    // === Assets ===
    pub assets: AssetPaths,
    /// Preload gives up on a file after this long (ms)
    pub asset_timeout_ms: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_session_secs: MIN_SESSION_SECS,
            max_session_secs: MAX_SESSION_SECS,
            tick_interval_ms: TICK_INTERVAL_MS,

            base_launch_speed: BASE_LAUNCH_SPEED,
            launch_speed_multiplier: LAUNCH_SPEED_MULTIPLIER,

            master_volume: 1.0,
            muted: false,

            assets: AssetPaths::default(),
            asset_timeout_ms: ASSET_LOAD_TIMEOUT_MS,
        }
    }
}

impl Settings {
    /// Element holding an optional JSON override
    pub const CONFIG_ELEMENT_ID: &'static str = "game-config";

    /// Parse a (possibly partial) JSON override on top of the defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would break the session policy
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_session_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "min_session_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_session_secs < self.min_session_secs {
            return Err(ConfigError::Invalid {
                field: "max_session_secs",
                reason: format!(
                    "{} is below min_session_secs ({})",
                    self.max_session_secs, self.min_session_secs
                ),
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_interval_ms",
                reason: "must be positive".to_string(),
            });
        }
        if self.base_launch_speed < 0 {
            return Err(ConfigError::Invalid {
                field: "base_launch_speed",
                reason: "must not be negative".to_string(),
            });
        }
        if !self.launch_speed_multiplier.is_finite() || self.launch_speed_multiplier < 0.0 {
            return Err(ConfigError::Invalid {
                field: "launch_speed_multiplier",
                reason: format!("{} is not a usable multiplier", self.launch_speed_multiplier),
            });
        }
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(ConfigError::Invalid {
                field: "master_volume",
                reason: format!("{} is outside 0.0 - 1.0", self.master_volume),
            });
        }
        if self.asset_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "asset_timeout_ms",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Preload timeout in seconds
    pub fn asset_timeout_secs(&self) -> f32 {
        self.asset_timeout_ms as f32 / 1000.0
    }

    /// Largest per-axis launch speed (pixels/s)
    pub fn launch_speed_limit(&self) -> i32 {
        (self.base_launch_speed as f32 * self.launch_speed_multiplier).round() as i32
    }

    /// Effective cue volume for a requested volume
    pub fn cue_volume(&self, requested: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            requested.clamp(0.0, 1.0) * self.master_volume
        }
    }

    /// Load the page override, falling back to defaults (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        match json {
            Some(json) if !json.trim().is_empty() => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from #{}", Self::CONFIG_ELEMENT_ID);
                    settings
                }
                Err(e) => {
                    log::error!("Ignoring settings override: {}", e);
                    Self::default()
                }
            },
            _ => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Native: defaults only
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
