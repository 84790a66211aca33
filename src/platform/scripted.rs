//! Deterministic backends for tests

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::assets::{AssetBackend, AssetKind, AssetRequest, ImageData, LoadReporter, LoadedAsset};
use crate::audio::CueSink;
use crate::error::AssetError;

/// A call made on a `RecordingSink`
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Play { looped: bool, volume: f32 },
    Stop,
}

/// Cue sink that records what it was asked to do
#[derive(Debug)]
pub struct RecordingSink {
    calls: Rc<RefCell<Vec<SinkCall>>>,
}

impl RecordingSink {
    pub fn new() -> (Self, Rc<RefCell<Vec<SinkCall>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                calls: calls.clone(),
            },
            calls,
        )
    }

    fn sharing(calls: Rc<RefCell<Vec<SinkCall>>>) -> Self {
        Self { calls }
    }
}

impl CueSink for RecordingSink {
    fn play(&mut self, looped: bool, volume: f32) {
        self.calls.borrow_mut().push(SinkCall::Play { looped, volume });
    }

    fn stop(&mut self) {
        self.calls.borrow_mut().push(SinkCall::Stop);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Missing,
    Fetch,
    Decode,
    Silent,
}

/// Asset backend with scripted outcomes
///
/// Every request succeeds unless marked otherwise. Deferred backends hold
/// their reports until `release_all`.
pub struct ScriptedAssets {
    outcomes: HashMap<String, Outcome>,
    image_size: (u32, u32),
    deferred: bool,
    held: Vec<(AssetRequest, LoadReporter)>,
    cue_calls: Rc<RefCell<Vec<SinkCall>>>,
}

impl ScriptedAssets {
    pub fn all_ok() -> Self {
        Self {
            outcomes: HashMap::new(),
            image_size: (32, 32),
            deferred: false,
            held: Vec::new(),
            cue_calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// `key` fails to fetch
    pub fn failing(mut self, key: &str) -> Self {
        self.outcomes.insert(key.to_string(), Outcome::Fetch);
        self
    }

    /// `key` fetches but cannot be decoded
    pub fn undecodable(mut self, key: &str) -> Self {
        self.outcomes.insert(key.to_string(), Outcome::Decode);
        self
    }

    /// `key` does not exist
    pub fn missing(mut self, key: &str) -> Self {
        self.outcomes.insert(key.to_string(), Outcome::Missing);
        self
    }

    /// `key` never reports back
    pub fn silent(mut self, key: &str) -> Self {
        self.outcomes.insert(key.to_string(), Outcome::Silent);
        self
    }

    pub fn with_image_size(mut self, width: u32, height: u32) -> Self {
        self.image_size = (width, height);
        self
    }

    /// Hold reports until `release_all`
    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    /// Report everything that was held back
    pub fn release_all(&mut self) {
        for (request, reporter) in std::mem::take(&mut self.held) {
            self.settle(&request, &reporter);
        }
    }

    /// Calls made on every audio sink this backend produced
    pub fn cue_calls(&self) -> Rc<RefCell<Vec<SinkCall>>> {
        self.cue_calls.clone()
    }

    fn settle(&self, request: &AssetRequest, reporter: &LoadReporter) {
        let key = request.key.clone();
        match self.outcomes.get(&request.key) {
            Some(Outcome::Missing) => reporter.fail(AssetError::NotFound {
                key,
                path: request.path.clone(),
            }),
            Some(Outcome::Fetch) => reporter.fail(AssetError::Fetch {
                key,
                reason: "connection reset".to_string(),
            }),
            Some(Outcome::Decode) => reporter.fail(AssetError::Decode {
                key,
                reason: "corrupt data".to_string(),
            }),
            Some(Outcome::Silent) => {}
            None => reporter.complete(&request.key, self.asset_for(request.kind)),
        }
    }

    fn asset_for(&self, kind: AssetKind) -> LoadedAsset {
        match kind {
            AssetKind::Audio => {
                LoadedAsset::Audio(Box::new(RecordingSink::sharing(self.cue_calls.clone())))
            }
            AssetKind::Image => {
                let (w, h) = self.image_size;
                LoadedAsset::Image(ImageData::new(w, h, vec![255; (w * h * 4) as usize]))
            }
        }
    }
}

impl AssetBackend for ScriptedAssets {
    fn fetch(&mut self, request: &AssetRequest, reporter: LoadReporter) {
        if self.deferred {
            self.held.push((request.clone(), reporter));
        } else {
            self.settle(request, &reporter);
        }
    }
}

thread_local! {
    static CAPTURED: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

/// Routes records into the current test thread's buffer
struct ThreadLogger;

impl Log for ThreadLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        CAPTURED.with(|lines| {
            lines
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static LOGGER: ThreadLogger = ThreadLogger;
static INSTALL: Once = Once::new();

/// Log records emitted on this thread since `capture_logs`
pub struct LogCapture;

/// Start collecting this thread's log records, dropping earlier ones
pub fn capture_logs() -> LogCapture {
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    CAPTURED.with(|lines| lines.borrow_mut().clear());
    LogCapture
}

impl LogCapture {
    /// Count records at `level` whose text contains `needle`
    pub fn count(&self, level: Level, needle: &str) -> usize {
        CAPTURED.with(|lines| {
            lines
                .borrow()
                .iter()
                .filter(|(l, text)| *l == level && text.contains(needle))
                .count()
        })
    }
}
