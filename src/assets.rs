//! Asset loading
//!
//! A scene declares what it needs during `preload`; the loader hands each
//! request to a platform backend, which reports back later through a
//! `LoadReporter`. Loads never block and a failed load never aborts the
//! others.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;

use crate::audio::CueSink;
use crate::error::AssetError;

/// What kind of file an asset is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Audio,
    Image,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Audio => "audio",
            AssetKind::Image => "image",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named file to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub key: String,
    pub kind: AssetKind,
    pub path: String,
}

/// Decoded image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 rows, or `None` when only the size is known
    pub rgba: Option<Vec<u8>>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba: Some(rgba),
        }
    }

    /// Pixels, if present and consistent with the stated size
    pub fn pixels(&self) -> Option<&[u8]> {
        let expected = self.width as usize * self.height as usize * 4;
        self.rgba
            .as_deref()
            .filter(|px| px.len() == expected && expected > 0)
    }
}

/// Result of a successful load
pub enum LoadedAsset {
    Audio(Box<dyn CueSink>),
    Image(ImageData),
}

impl LoadedAsset {
    pub fn kind(&self) -> AssetKind {
        match self {
            LoadedAsset::Audio(_) => AssetKind::Audio,
            LoadedAsset::Image(_) => AssetKind::Image,
        }
    }
}

impl fmt::Debug for LoadedAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadedAsset::Audio(sink) => f.debug_tuple("Audio").field(sink).finish(),
            LoadedAsset::Image(img) => f
                .debug_struct("Image")
                .field("width", &img.width)
                .field("height", &img.height)
                .finish(),
        }
    }
}

/// Outcome of one request, as reported by a backend
#[derive(Debug)]
pub enum LoadEvent {
    Complete { key: String, asset: LoadedAsset },
    Failed { error: AssetError },
}

/// Channel a backend uses to report load outcomes
///
/// Cheap to clone. Once closed (teardown), reports are dropped.
#[derive(Clone, Default)]
pub struct LoadReporter {
    events: Rc<RefCell<VecDeque<LoadEvent>>>,
    closed: Rc<Cell<bool>>,
}

impl LoadReporter {
    pub fn complete(&self, key: &str, asset: LoadedAsset) {
        self.push(LoadEvent::Complete {
            key: key.to_string(),
            asset,
        });
    }

    pub fn fail(&self, error: AssetError) {
        self.push(LoadEvent::Failed { error });
    }

    fn push(&self, event: LoadEvent) {
        if self.closed.get() {
            return;
        }
        self.events.borrow_mut().push_back(event);
    }

    fn drain(&self) -> Vec<LoadEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    fn close(&self) {
        self.closed.set(true);
        self.events.borrow_mut().clear();
    }
}

/// Platform-specific fetcher
pub trait AssetBackend {
    /// Begin loading `request`; report the outcome through `reporter`,
    /// now or later.
    fn fetch(&mut self, request: &AssetRequest, reporter: LoadReporter);
}

/// Everything that settled during preload
#[derive(Debug, Default)]
pub struct AssetCache {
    loaded: HashMap<String, LoadedAsset>,
    failed: Vec<AssetError>,
}

impl AssetCache {
    pub fn contains(&self, key: &str) -> bool {
        self.loaded.contains_key(key)
    }

    pub fn image(&self, key: &str) -> Option<&ImageData> {
        match self.loaded.get(key) {
            Some(LoadedAsset::Image(img)) => Some(img),
            _ => None,
        }
    }

    pub fn take_image(&mut self, key: &str) -> Option<ImageData> {
        match self.loaded.remove(key) {
            Some(LoadedAsset::Image(img)) => Some(img),
            Some(other) => {
                self.loaded.insert(key.to_string(), other);
                None
            }
            None => None,
        }
    }

    pub fn take_audio(&mut self, key: &str) -> Option<Box<dyn CueSink>> {
        match self.loaded.remove(key) {
            Some(LoadedAsset::Audio(sink)) => Some(sink),
            Some(other) => {
                self.loaded.insert(key.to_string(), other);
                None
            }
            None => None,
        }
    }

    pub fn failures(&self) -> &[AssetError] {
        &self.failed
    }
}

type CompleteObserver = Box<dyn FnMut(&str, AssetKind)>;
type ErrorObserver = Box<dyn FnMut(&AssetError)>;

/// Collects requests during preload and tracks them until they settle
#[derive(Default)]
pub struct Loader {
    requests: Vec<AssetRequest>,
    pending: HashSet<String>,
    kinds: HashMap<String, AssetKind>,
    started: bool,
    elapsed: f32,
    timeout_secs: Option<f32>,
    reporter: LoadReporter,
    cache: AssetCache,
    on_complete: Vec<CompleteObserver>,
    on_file_error: Vec<ErrorObserver>,
    on_load_error: Vec<ErrorObserver>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an audio file
    pub fn audio(&mut self, key: &str, path: &str) {
        self.request(key, AssetKind::Audio, path);
    }

    /// Queue an image file
    pub fn image(&mut self, key: &str, path: &str) {
        self.request(key, AssetKind::Image, path);
    }

    fn request(&mut self, key: &str, kind: AssetKind, path: &str) {
        if self.started {
            log::warn!("Ignoring request for `{}` after loading started", key);
            return;
        }
        if self.kinds.contains_key(key) {
            log::warn!("Asset key `{}` already queued", key);
            return;
        }
        self.kinds.insert(key.to_string(), kind);
        self.requests.push(AssetRequest {
            key: key.to_string(),
            kind,
            path: path.to_string(),
        });
    }

    /// Called for every file that loads
    pub fn on_file_complete(&mut self, observer: impl FnMut(&str, AssetKind) + 'static) {
        self.on_complete.push(Box::new(observer));
    }

    /// Called for every file that could not be fetched
    pub fn on_file_error(&mut self, observer: impl FnMut(&AssetError) + 'static) {
        self.on_file_error.push(Box::new(observer));
    }

    /// Called for every file that was fetched but could not be processed
    pub fn on_load_error(&mut self, observer: impl FnMut(&AssetError) + 'static) {
        self.on_load_error.push(Box::new(observer));
    }

    pub fn requests(&self) -> &[AssetRequest] {
        &self.requests
    }

    /// Give up on requests still pending `secs` after loading started
    pub fn set_timeout(&mut self, secs: f32) {
        self.timeout_secs = Some(secs);
    }

    /// Move the loader's clock forward. Requests still pending once the
    /// timeout has passed fail with a fetch error. Returns how many did.
    pub fn advance(&mut self, dt: f32) -> usize {
        if !self.started || self.pending.is_empty() {
            return 0;
        }
        self.elapsed += dt.max(0.0);
        let Some(limit) = self.timeout_secs else {
            return 0;
        };
        if self.elapsed < limit {
            return 0;
        }

        let stalled: Vec<String> = self
            .requests
            .iter()
            .filter(|r| self.pending.contains(&r.key))
            .map(|r| r.key.clone())
            .collect();
        for key in &stalled {
            self.pending.remove(key);
            let error = AssetError::Fetch {
                key: key.clone(),
                reason: format!("timed out after {:.1} s", limit),
            };
            self.notify_error(&error);
            self.cache.failed.push(error);
        }
        stalled.len()
    }

    /// Hand every queued request to the backend
    pub fn start(&mut self, backend: &mut dyn AssetBackend) {
        if self.started {
            return;
        }
        self.started = true;
        for request in &self.requests {
            self.pending.insert(request.key.clone());
        }
        for request in &self.requests {
            backend.fetch(request, self.reporter.clone());
        }
    }

    /// Apply reported outcomes. Returns how many requests settled.
    pub fn pump(&mut self) -> usize {
        let mut settled = 0;
        for event in self.reporter.drain() {
            match event {
                LoadEvent::Complete { key, asset } => {
                    if !self.pending.remove(&key) {
                        log::debug!("Dropping unexpected load of `{}`", key);
                        continue;
                    }
                    let kind = asset.kind();
                    if self.kinds.get(&key) != Some(&kind) {
                        let error = AssetError::Decode {
                            key: key.clone(),
                            reason: format!("expected {}, got {}", self.kinds[&key], kind),
                        };
                        self.notify_error(&error);
                        self.cache.failed.push(error);
                    } else {
                        for observer in &mut self.on_complete {
                            observer(&key, kind);
                        }
                        self.cache.loaded.insert(key, asset);
                    }
                    settled += 1;
                }
                LoadEvent::Failed { error } => {
                    if !self.pending.remove(error.key()) {
                        log::debug!("Dropping unexpected failure for `{}`", error.key());
                        continue;
                    }
                    self.notify_error(&error);
                    self.cache.failed.push(error);
                    settled += 1;
                }
            }
        }
        settled
    }

    fn notify_error(&mut self, error: &AssetError) {
        let observers = if error.is_decode() {
            &mut self.on_load_error
        } else {
            &mut self.on_file_error
        };
        for observer in observers {
            observer(error);
        }
    }

    /// Every request has either loaded or failed
    pub fn is_settled(&self) -> bool {
        self.started && self.pending.is_empty()
    }

    /// Move the settled results out
    pub fn take_cache(&mut self) -> AssetCache {
        std::mem::take(&mut self.cache)
    }

    /// Stop listening: late reports are dropped and observers released
    pub fn close(&mut self) {
        self.reporter.close();
        self.pending.clear();
        self.on_complete.clear();
        self.on_file_error.clear();
        self.on_load_error.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::scripted::ScriptedAssets;

    fn loader_with_three() -> Loader {
        let mut loader = Loader::new();
        loader.audio("tick", "assets/clock.mp3");
        loader.image("ball", "assets/ball.png");
        loader.image("background", "assets/background.png");
        loader
    }

    #[test]
    fn test_all_load() {
        let mut loader = loader_with_three();
        let completed = Rc::new(RefCell::new(Vec::new()));
        let seen = completed.clone();
        loader.on_file_complete(move |key, kind| seen.borrow_mut().push((key.to_string(), kind)));

        let mut backend = ScriptedAssets::all_ok();
        loader.start(&mut backend);
        assert!(!loader.is_settled());
        assert_eq!(loader.pump(), 3);
        assert!(loader.is_settled());

        assert_eq!(completed.borrow().len(), 3);
        assert!(completed.borrow().contains(&("tick".to_string(), AssetKind::Audio)));

        let mut cache = loader.take_cache();
        assert!(cache.failures().is_empty());
        assert!(cache.take_audio("tick").is_some());
        assert!(cache.image("ball").is_some());
        assert!(cache.take_image("background").is_some());
    }

    #[test]
    fn test_failure_routed_to_right_observer() {
        let mut loader = loader_with_three();
        let file_errors = Rc::new(Cell::new(0));
        let load_errors = Rc::new(Cell::new(0));
        let fe = file_errors.clone();
        let le = load_errors.clone();
        loader.on_file_error(move |_| fe.set(fe.get() + 1));
        loader.on_load_error(move |_| le.set(le.get() + 1));

        let mut backend = ScriptedAssets::all_ok()
            .failing("tick")
            .undecodable("background");
        loader.start(&mut backend);
        loader.pump();

        assert!(loader.is_settled());
        assert_eq!(file_errors.get(), 1);
        assert_eq!(load_errors.get(), 1);

        let cache = loader.take_cache();
        assert_eq!(cache.failures().len(), 2);
        assert!(!cache.contains("tick"));
        assert!(cache.contains("ball"));
    }

    #[test]
    fn test_deferred_backend_settles_later() {
        let mut loader = loader_with_three();
        let mut backend = ScriptedAssets::all_ok().deferred();
        loader.start(&mut backend);
        assert_eq!(loader.pump(), 0);
        assert!(!loader.is_settled());

        backend.release_all();
        assert_eq!(loader.pump(), 3);
        assert!(loader.is_settled());
    }

    #[test]
    fn test_no_requests_is_settled_once_started() {
        let mut loader = Loader::new();
        assert!(!loader.is_settled());
        loader.start(&mut ScriptedAssets::all_ok());
        assert!(loader.is_settled());
    }

    #[test]
    fn test_duplicate_key_ignored() {
        let mut loader = Loader::new();
        loader.image("ball", "a.png");
        loader.image("ball", "b.png");
        assert_eq!(loader.requests().len(), 1);
        assert_eq!(loader.requests()[0].path, "a.png");
    }

    #[test]
    fn test_stalled_request_times_out() {
        let mut loader = loader_with_three();
        loader.set_timeout(2.0);
        let failed = Rc::new(RefCell::new(Vec::new()));
        let seen = failed.clone();
        loader.on_file_error(move |e| seen.borrow_mut().push(e.key().to_string()));

        let mut backend = ScriptedAssets::all_ok().silent("tick");
        loader.start(&mut backend);
        assert_eq!(loader.pump(), 2);
        assert!(!loader.is_settled());

        assert_eq!(loader.advance(1.5), 0);
        assert!(!loader.is_settled());
        assert_eq!(loader.advance(0.5), 1);
        assert!(loader.is_settled());
        assert_eq!(*failed.borrow(), vec!["tick".to_string()]);

        let cache = loader.take_cache();
        assert!(matches!(
            cache.failures(),
            [AssetError::Fetch { key, .. }] if key == "tick"
        ));
        assert!(cache.contains("ball"));
    }

    #[test]
    fn test_no_timeout_waits_forever() {
        let mut loader = loader_with_three();
        loader.start(&mut ScriptedAssets::all_ok().silent("ball"));
        loader.pump();
        assert_eq!(loader.advance(3600.0), 0);
        assert!(!loader.is_settled());
    }

    #[test]
    fn test_report_after_timeout_is_dropped() {
        let mut loader = loader_with_three();
        loader.set_timeout(1.0);
        let completed = Rc::new(Cell::new(0));
        let seen = completed.clone();
        loader.on_file_complete(move |_, _| seen.set(seen.get() + 1));

        let mut backend = ScriptedAssets::all_ok().deferred();
        loader.start(&mut backend);
        assert_eq!(loader.advance(1.0), 3);
        backend.release_all();

        assert_eq!(loader.pump(), 0);
        assert_eq!(completed.get(), 0);
        assert_eq!(loader.take_cache().failures().len(), 3);
    }

    #[test]
    fn test_reports_after_close_are_dropped() {
        let mut loader = loader_with_three();
        let completed = Rc::new(Cell::new(0));
        let seen = completed.clone();
        loader.on_file_complete(move |_, _| seen.set(seen.get() + 1));

        let mut backend = ScriptedAssets::all_ok().deferred();
        loader.start(&mut backend);
        loader.close();
        backend.release_all();

        assert_eq!(loader.pump(), 0);
        assert_eq!(completed.get(), 0);
    }
}
