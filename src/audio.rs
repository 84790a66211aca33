//! Loopable sound cue
//!
//! The cue tracks its own play state; the platform sink only does the
//! actual playback. A cue whose file failed to load has no sink and every
//! play request is logged and ignored.

use std::fmt;

/// Platform playback for one loaded sound
pub trait CueSink: fmt::Debug {
    /// Start (or restart) playback
    fn play(&mut self, looped: bool, volume: f32);
    /// Stop playback and rewind
    fn stop(&mut self);
}

/// Observable cue state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CueState {
    /// The sound never loaded (or was released)
    Missing,
    Stopped,
    Playing { looped: bool, volume: f32 },
}

/// A named, loopable sound
#[derive(Debug)]
pub struct SoundCue {
    key: String,
    sink: Option<Box<dyn CueSink>>,
    state: CueState,
}

impl SoundCue {
    /// Cue backed by a loaded sound
    pub fn loaded(key: &str, sink: Box<dyn CueSink>) -> Self {
        Self {
            key: key.to_string(),
            sink: Some(sink),
            state: CueState::Stopped,
        }
    }

    /// Cue whose sound failed to load
    pub fn missing(key: &str) -> Self {
        Self {
            key: key.to_string(),
            sink: None,
            state: CueState::Missing,
        }
    }

    pub fn state(&self) -> CueState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.sink.is_some()
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, CueState::Playing { .. })
    }

    /// Play the cue. Returns false when there is nothing to play.
    pub fn play(&mut self, looped: bool, volume: f32) -> bool {
        let Some(sink) = self.sink.as_mut() else {
            log::error!("Tick sound not initialized");
            return false;
        };
        let volume = volume.clamp(0.0, 1.0);
        log::info!("Playing tick sound...");
        sink.play(looped, volume);
        self.state = CueState::Playing { looped, volume };
        true
    }

    /// Stop the cue; a no-op unless it is playing
    pub fn stop(&mut self) {
        if !self.is_playing() {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.stop();
        }
        self.state = CueState::Stopped;
    }

    /// Stop and drop the platform sound
    pub fn release(&mut self) {
        self.stop();
        if self.sink.take().is_some() {
            log::debug!("Released sound `{}`", self.key);
        }
        self.state = CueState::Missing;
    }
}
