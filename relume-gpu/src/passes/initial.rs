use crate::{
    eval_target_function, DiReservoir, DiSample, F32Ext, InitialSettings,
    LightSample, Noise, Scene, Surface, NUDGE_OFFSET,
};

/// Generates given pixel's initial-candidate reservoir: streams a handful of
/// uniformly sampled points on emissive triangles through the reservoir,
/// weighting each by `target_function / solid_angle_pdf`.
pub fn sample_initial_candidates(
    scene: &impl Scene,
    settings: &InitialSettings,
    surface: &Surface,
    noise: &mut Noise,
) -> DiReservoir {
    let mut reservoir = DiReservoir::default();

    if surface.is_none() {
        return reservoir;
    }

    for _ in 0..settings.light_candidates {
        let Some(candidate) = scene.sample_emissive(noise) else {
            // No emissive geometry; the candidate still counts as considered
            reservoir.add_candidate(noise, DiSample::default(), 0.0);
            continue;
        };

        let light = LightSample::triangle(candidate.triangle_id, candidate.point);
        let (direction, distance) = light.direction_from(surface.point);

        // Area-measure density to solid-angle-measure density
        let cos_light = (-direction).dot(candidate.normal).max(0.0);
        let pdf = candidate.pdf_area * distance.sqr() / cos_light;

        let target_function = eval_target_function(
            scene,
            &light,
            surface,
            settings.use_visibility,
        );

        let weight = if pdf.is_finite() && pdf > 0.0 {
            target_function / pdf
        } else {
            0.0
        };

        let sample = DiSample {
            light,
            target_function,
        };

        reservoir.add_candidate(noise, sample, weight);
    }

    reservoir.finalize(reservoir.sample.target_function);
    reservoir
}

/// Visibility-reuse step: discards the retained sample if it turns out to be
/// occluded, so that downstream passes only ever resample samples that
/// actually contribute.
pub fn reuse_visibility(
    scene: &impl Scene,
    surface: &Surface,
    reservoir: &mut DiReservoir,
) {
    if reservoir.ucw <= 0.0 {
        return;
    }

    let origin = surface.point + surface.normal * NUDGE_OFFSET;
    let (direction, distance) = reservoir.sample.light.direction_from(origin);

    if scene.is_occluded(origin, direction, distance) {
        reservoir.ucw = 0.0;
    }
}
