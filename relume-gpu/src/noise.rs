use core::f32::consts::PI;

use glam::{vec2, UVec2, Vec2};

/// Per-pixel pseudo-random stream.
///
/// Each pixel owns a private generator seeded from `(seed, pixel, frame)`, so
/// results are reproducible for a fixed seed and no two pixels ever share
/// mutable state.
#[derive(Clone, Copy)]
pub struct Noise {
    state: u32,
}

impl Noise {
    pub fn new(seed: u32, id: UVec2, frame: u32) -> Self {
        Self {
            state: seed
                ^ 48619u32.wrapping_mul(id.x)
                ^ 95461u32.wrapping_mul(id.y)
                ^ 76829u32.wrapping_mul(frame.wrapping_add(1)),
        }
    }

    /// Splits off an independent generator, advancing this one by a single
    /// draw.
    ///
    /// The fork is `Copy`, which matters for neighbor selection: every
    /// enumeration of one pixel's neighbor set gets a *copy* of the same
    /// fork, so all enumerations consume an identical stream and agree on
    /// which neighbors were chosen.
    pub fn fork(&mut self) -> Self {
        Self {
            state: self.sample_int(),
        }
    }

    /// Generates a uniform sample in range `<0.0, 1.0>`.
    pub fn sample(&mut self) -> f32 {
        (self.sample_int() as f32) / (u32::MAX as f32)
    }

    /// Generates a uniform sample in range `<0, u32::MAX>`.
    pub fn sample_int(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(747796405).wrapping_add(2891336453);

        let word = ((self.state >> ((self.state >> 28) + 4)) ^ self.state)
            .wrapping_mul(277803737);

        (word >> 22) ^ word
    }

    /// Generates a uniform sample on a circle.
    pub fn sample_circle(&mut self) -> Vec2 {
        let angle = self.sample() * PI * 2.0;

        vec2(angle.cos(), angle.sin())
    }

    /// Generates a uniform sample inside of a disk.
    pub fn sample_disk(&mut self) -> Vec2 {
        let radius = self.sample().sqrt();

        self.sample_circle() * radius
    }
}

/// Returns the `i`-th point of the `count`-point Hammersley set.
///
/// Point zero is always the origin, which neighbor selection relies on
/// (it skips it, since offset zero would just reselect the center pixel).
pub fn hammersley_2d(count: u32, i: u32) -> Vec2 {
    vec2((i as f32) / (count as f32), radical_inverse_vdc(i))
}

fn radical_inverse_vdc(bits: u32) -> f32 {
    (bits.reverse_bits() as f32) * 2.328_306_4e-10
}

/// Maps a uniform `<0.0, 1.0>²` sample into a disk of given radius.
pub fn disk_point(uv: Vec2, radius: f32) -> Vec2 {
    let r = radius * uv.x.sqrt();
    let theta = 2.0 * PI * uv.y;

    vec2(r * theta.cos(), r * theta.sin())
}
