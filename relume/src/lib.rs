//! Relume is a CPU-side reference renderer built around reservoir-based
//! spatiotemporal resampling of direct lighting.
//!
//! The per-pixel kernels live in `relume-gpu`; this crate owns the scene,
//! the per-pixel buffers and the frame loop that maps the kernels over the
//! viewport.

mod buffers;
mod renderer;
mod scene;

pub use self::buffers::*;
pub use self::renderer::*;
pub use self::scene::*;

pub use relume_gpu as gpu;
pub use relume_gpu::{
    BiasCorrection, Camera, DiReservoir, InitialSettings, Scene, Settings,
    SimilarityHeuristics, SpatialSettings, Surface, TemporalSettings,
};
