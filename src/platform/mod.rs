//! Platform backends
//!
//! Asset fetching, audio output and repeating timers differ between the
//! browser and a native host:
//! - `web`: DOM image/audio elements and `setInterval`
//! - `native`: files on disk, logged audio, simulated time
//! - `scripted`: in-memory backends for tests
//!
//! `lifecycle` tracks whether the page still owns the game on every target.

pub mod lifecycle;
#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(test)]
pub mod scripted;
#[cfg(target_arch = "wasm32")]
pub mod web;
