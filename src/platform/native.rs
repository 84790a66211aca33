//! Native backends
//!
//! There is no window or audio device natively. Images are decoded from
//! disk with `image`; audio files are only checked for existence and the cue
//! just logs.

use std::path::PathBuf;

use crate::assets::{AssetBackend, AssetKind, AssetRequest, ImageData, LoadReporter, LoadedAsset};
use crate::audio::CueSink;
use crate::error::AssetError;

/// Loads assets relative to a root directory
#[derive(Debug, Clone)]
pub struct FsAssetBackend {
    root: PathBuf,
}

impl FsAssetBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn load(&self, request: &AssetRequest) -> Result<LoadedAsset, AssetError> {
        let path = self.root.join(&request.path);
        if !path.is_file() {
            return Err(AssetError::NotFound {
                key: request.key.clone(),
                path: path.display().to_string(),
            });
        }
        match request.kind {
            AssetKind::Audio => Ok(LoadedAsset::Audio(Box::new(LoggingCueSink::new(
                &request.key,
            )))),
            AssetKind::Image => {
                let rgba = image::open(&path)
                    .map_err(|e| image_error(&request.key, e))?
                    .to_rgba8();
                let (width, height) = rgba.dimensions();
                Ok(LoadedAsset::Image(ImageData::new(
                    width,
                    height,
                    rgba.into_raw(),
                )))
            }
        }
    }
}

fn image_error(key: &str, error: image::ImageError) -> AssetError {
    match error {
        image::ImageError::IoError(e) => AssetError::Fetch {
            key: key.to_string(),
            reason: e.to_string(),
        },
        other => AssetError::Decode {
            key: key.to_string(),
            reason: other.to_string(),
        },
    }
}

impl AssetBackend for FsAssetBackend {
    fn fetch(&mut self, request: &AssetRequest, reporter: LoadReporter) {
        match self.load(request) {
            Ok(asset) => reporter.complete(&request.key, asset),
            Err(e) => reporter.fail(e),
        }
    }
}

/// Audio sink that only logs
#[derive(Debug)]
pub struct LoggingCueSink {
    key: String,
}

impl LoggingCueSink {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }
}

impl CueSink for LoggingCueSink {
    fn play(&mut self, looped: bool, volume: f32) {
        log::debug!("[{}] play looped={} volume={:.2}", self.key, looped, volume);
    }

    fn stop(&mut self) {
        log::debug!("[{}] stop", self.key);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::assets::Loader;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "bounce-session-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_loads_from_disk() {
        let dir = scratch_dir("ok");
        let ball = image::RgbaImage::from_pixel(40, 30, image::Rgba([200, 100, 40, 255]));
        ball.save(dir.join("ball.png")).unwrap();
        fs::write(dir.join("clock.mp3"), b"ID3").unwrap();
        fs::write(dir.join("broken.png"), b"definitely not an image").unwrap();

        let mut loader = Loader::new();
        loader.image("ball", "ball.png");
        loader.audio("tick", "clock.mp3");
        loader.image("broken", "broken.png");
        loader.image("gone", "nothing-here.png");
        loader.start(&mut FsAssetBackend::new(&dir));
        assert_eq!(loader.pump(), 4);

        let mut cache = loader.take_cache();
        let img = cache.image("ball").unwrap();
        assert_eq!((img.width, img.height), (40, 30));
        let pixels = img.pixels().unwrap();
        assert_eq!(pixels.len(), 40 * 30 * 4);
        assert_eq!(&pixels[..4], &[200, 100, 40, 255]);
        assert!(cache.take_audio("tick").is_some());

        let failures = cache.failures();
        assert_eq!(failures.len(), 2);
        assert!(failures.iter().any(|e| e.key() == "broken" && e.is_decode()));
        assert!(
            failures
                .iter()
                .any(|e| matches!(e, AssetError::NotFound { key, .. } if key == "gone"))
        );

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_shipped_images_decode() {
        let mut loader = Loader::new();
        loader.image("ball", "assets/ball.png");
        loader.image("background", "assets/background.png");
        loader.start(&mut FsAssetBackend::new(env!("CARGO_MANIFEST_DIR")));
        loader.pump();

        let cache = loader.take_cache();
        assert!(cache.failures().is_empty());
        assert!(cache.image("ball").and_then(ImageData::pixels).is_some());
        assert_eq!(
            cache.image("background").map(|i| (i.width, i.height)),
            Some((800, 600))
        );
    }
}
