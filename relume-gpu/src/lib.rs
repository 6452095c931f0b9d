//! Common structs and per-pixel kernels used by Relume's resampling pipeline.
//!
//! Everything in this crate is written as plain data-parallel Rust: each pass
//! is a pure function of one pixel's inputs, so the same code can be mapped
//! over a thread pool on the CPU or ported 1:1 to a SIMT backend.

mod bias;
mod camera;
mod light;
mod neighbors;
mod noise;
mod passes;
mod reservoir;
mod scene;
mod settings;
mod surface;
mod target;
mod utils;

#[cfg(test)]
pub(crate) use self::scene::testing;

pub use self::bias::*;
pub use self::camera::*;
pub use self::light::*;
pub use self::neighbors::*;
pub use self::noise::*;
pub use self::passes::*;
pub use self::reservoir::*;
pub use self::scene::*;
pub use self::settings::*;
pub use self::surface::*;
pub use self::target::*;
pub use self::utils::*;

pub mod prelude {
    pub use core::f32::consts::PI;

    pub use glam::*;

    pub use crate::*;
}

/// How far to move a shading point along its normal before casting shadow
/// rays, to avoid self-intersection.
pub const NUDGE_OFFSET: f32 = 1.0e-4;

/// Distance used for shadow rays towards infinitely-distant samples, e.g.
/// environment-map ones.
pub const FAR_DISTANCE: f32 = 1.0e35;
