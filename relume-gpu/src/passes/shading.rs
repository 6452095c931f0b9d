use glam::Vec3;

use crate::{DiReservoir, Scene, Surface, NUDGE_OFFSET};

/// Turns given pixel's final reservoir into outgoing radiance:
/// `bsdf * emitted_radiance * cosine * ucw`, plus whatever the primary ray
/// saw directly (emissive geometry or the environment).
///
/// A final shadow ray confirms the retained sample is actually visible;
/// earlier passes evaluate target functions without visibility by default, so
/// occluded samples can survive all the way here.
pub fn shade(
    scene: &impl Scene,
    surface: &Surface,
    direct: Vec3,
    reservoir: &DiReservoir,
) -> Vec3 {
    if surface.is_none() || reservoir.ucw <= 0.0 {
        return direct;
    }

    let sample = &reservoir.sample.light;
    let origin = surface.point + surface.normal * NUDGE_OFFSET;
    let (direction, distance) = sample.direction_from(origin);

    let cosine = surface.normal.dot(direction).max(0.0);
    let bsdf = scene.eval_bsdf(surface, direction);

    let emission = if sample.is_envmap() {
        scene.env_radiance(direction)
    } else {
        scene.emission(sample.triangle_id)
    };

    let radiance = bsdf * emission * cosine * reservoir.ucw;

    if radiance == Vec3::ZERO {
        return direct;
    }

    if scene.is_occluded(origin, direction, distance) {
        return direct;
    }

    direct + radiance
}
