//! Per-pixel kernels, one module per pass; the host maps each of them over
//! the whole viewport.

mod gbuffer;
mod initial;
mod shading;
mod spatial;
mod temporal;

pub use self::gbuffer::*;
pub use self::initial::*;
pub use self::shading::*;
pub use self::spatial::*;
pub use self::temporal::*;
