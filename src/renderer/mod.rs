//! WebGPU rendering module
//!
//! The whole frame is drawn by one fragment shader over a full-screen
//! triangle: the background image letterboxed to the playfield, then the
//! ball as a signed-distance disc textured with the ball image.

pub mod sdf_pipeline;

pub use sdf_pipeline::{BounceRenderState, Globals};
