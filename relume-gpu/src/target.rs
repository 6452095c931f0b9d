use crate::{LightSample, Scene, Surface, Vec3Ext};

/// Evaluates the (unnormalized) importance of a light sample at a surface:
/// BSDF response times emitted radiance times the cosine term, reduced to
/// luminance, optionally times visibility.
///
/// The visibility test is the expensive part, so call sites pick per-pass
/// whether they can afford it; the analytic portion always short-circuits
/// before the shadow ray gets traced.
pub fn eval_target_function(
    scene: &impl Scene,
    sample: &LightSample,
    surface: &Surface,
    use_visibility: bool,
) -> f32 {
    if sample.is_none() {
        return 0.0;
    }

    let (direction, distance) = sample.direction_from(surface.point);

    let cosine = surface.normal.dot(direction).max(0.0);

    if cosine == 0.0 {
        return 0.0;
    }

    let bsdf = scene.eval_bsdf(surface, direction);

    let emission = if sample.is_envmap() {
        scene.env_radiance(direction)
    } else {
        scene.emission(sample.triangle_id)
    };

    let target_function = (bsdf * emission * cosine).luma();

    if target_function == 0.0 {
        return 0.0;
    }

    if use_visibility
        && scene.is_occluded(surface.point, direction, distance)
    {
        return 0.0;
    }

    target_function
}
