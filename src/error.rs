//! Error types
//!
//! Nothing here is fatal to the game: asset errors are logged and the
//! surface carries on without the asset, config errors fall back to defaults.

/// Failure to obtain one named asset.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// The file does not exist at the requested path
    #[error("asset `{key}` not found at {path}")]
    NotFound { key: String, path: String },

    /// The file could not be fetched
    #[error("failed to load asset `{key}`: {reason}")]
    Fetch { key: String, reason: String },

    /// The file arrived but could not be decoded
    #[error("failed to process asset `{key}`: {reason}")]
    Decode { key: String, reason: String },
}

impl AssetError {
    /// Key of the asset that failed
    pub fn key(&self) -> &str {
        match self {
            AssetError::NotFound { key, .. }
            | AssetError::Fetch { key, .. }
            | AssetError::Decode { key, .. } => key,
        }
    }

    /// Whether the file was retrieved but could not be used
    pub fn is_decode(&self) -> bool {
        matches!(self, AssetError::Decode { .. })
    }
}

/// Invalid settings override.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("settings are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failure to bring up the GPU renderer.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}
