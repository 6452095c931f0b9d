use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4, Vec4Swizzles};

use crate::{F32Ext, Reservoir, Scene};

/// Point on a light, as retained by a reservoir.
///
/// Either a point on an emissive triangle, or - for environment-map samples -
/// a direction, with `point` holding the (unit) direction instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSample {
    pub triangle_id: u32,
    pub point: Vec3,
    pub flags: u32,
}

impl Default for LightSample {
    fn default() -> Self {
        Self::none()
    }
}

impl LightSample {
    pub const NO_TRIANGLE: u32 = 0x7fff_ffff;
    pub const FLAG_ENVMAP: u32 = 1;

    pub fn triangle(triangle_id: u32, point: Vec3) -> Self {
        Self {
            triangle_id,
            point,
            flags: 0,
        }
    }

    pub fn envmap(direction: Vec3) -> Self {
        Self {
            triangle_id: Self::NO_TRIANGLE,
            point: direction,
            flags: Self::FLAG_ENVMAP,
        }
    }

    pub fn none() -> Self {
        Self {
            triangle_id: Self::NO_TRIANGLE,
            point: Vec3::ZERO,
            flags: 0,
        }
    }

    pub fn is_envmap(&self) -> bool {
        self.flags & Self::FLAG_ENVMAP != 0
    }

    /// Whether this sample references any light at all.
    pub fn is_some(&self) -> bool {
        self.triangle_id != Self::NO_TRIANGLE || self.is_envmap()
    }

    pub fn is_none(&self) -> bool {
        !self.is_some()
    }

    /// Returns the unit direction from `point` towards this sample, together
    /// with the distance to it; environment samples are infinitely distant.
    pub fn direction_from(&self, point: Vec3) -> (Vec3, f32) {
        if self.is_envmap() {
            (self.point, crate::FAR_DISTANCE)
        } else {
            let to_light = self.point - point;
            let distance = to_light.length();

            (to_light / distance, distance)
        }
    }
}

/// Direct-lighting sample: the retained light sample plus its target-function
/// value, cached as evaluated at the surface owning the reservoir.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiSample {
    pub light: LightSample,
    pub target_function: f32,
}

/// Reservoir for resampling direct lighting.
///
/// See: [`Reservoir`].
pub type DiReservoir = Reservoir<DiSample>;

/// Flat, GPU-layout record of a [`DiReservoir`]; this is the shape reservoir
/// buffers have at rest, so that a SIMT backend can share them unchanged.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct DiReservoirData {
    pub d0: Vec4,
    pub d1: Vec4,
}

impl DiReservoirData {
    pub fn pack(reservoir: DiReservoir) -> Self {
        let sample = reservoir.sample;

        Self {
            d0: Vec4::new(
                reservoir.w_sum,
                reservoir.ucw,
                reservoir.m,
                sample.target_function,
            ),
            d1: sample.light.point.extend(f32::from_bits(
                (sample.light.flags << 31) | sample.light.triangle_id,
            )),
        }
    }

    pub fn unpack(self) -> DiReservoir {
        let tag = self.d1.w.to_bits();

        DiReservoir {
            sample: DiSample {
                light: LightSample {
                    triangle_id: tag & LightSample::NO_TRIANGLE,
                    point: self.d1.xyz(),
                    flags: tag >> 31,
                },
                target_function: self.d0.w,
            },
            w_sum: self.d0.x,
            ucw: self.d0.y,
            m: self.d0.z,
        }
    }
}

/// Jacobian determinant of the reconnection shift: converts the solid-angle
/// density of `sample` as seen from `neighbor_point` into the density it has
/// at `center_point`.
///
/// Returns `None` when the two viewpoints are too geometrically dissimilar
/// for reuse to be safe - the ratio falls outside `<1 / max_ratio,
/// max_ratio>` or is not finite. Environment samples shift with a jacobian of
/// exactly one, as do same-point "shifts".
pub fn reconnection_jacobian(
    scene: &impl Scene,
    sample: &LightSample,
    center_point: Vec3,
    neighbor_point: Vec3,
    max_ratio: f32,
) -> Option<f32> {
    if sample.is_envmap() {
        return Some(1.0);
    }

    let (dir_at_center, dist_at_center) = sample.direction_from(center_point);
    let (dir_at_neighbor, dist_at_neighbor) =
        sample.direction_from(neighbor_point);

    let light_normal = scene.light_normal(sample.triangle_id);

    let cos_at_center = (-dir_at_center).dot(light_normal).abs();
    let cos_at_neighbor = (-dir_at_neighbor).dot(light_normal).abs();

    let jacobian = (cos_at_center / cos_at_neighbor) * dist_at_neighbor.sqr()
        / dist_at_center.sqr();

    if jacobian.is_finite()
        && jacobian <= max_ratio
        && jacobian >= 1.0 / max_ratio
    {
        Some(jacobian)
    } else {
        None
    }
}
