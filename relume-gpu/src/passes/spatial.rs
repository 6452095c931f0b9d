use crate::{
    eval_target_function, reconnection_jacobian, DiReservoir, Noise, Scene,
    Settings, SpatialContext,
};

/// Spatial-reuse pass: resamples given pixel's reservoir together with a few
/// of its neighbors' into one combined reservoir.
///
/// Every accepted neighbor participates with weight `mis_weight *
/// target_function * jacobian * ucw`, where the target function rates the
/// neighbor's sample at the *center* surface and the jacobian accounts for
/// the reconnection shift between the two shading points. Neighbors with
/// nothing to contribute (no valid sample, or a rejected jacobian) still
/// feed their confidence into the output.
///
/// `ctx` must be built around the pass's *input* buffers; the host is
/// responsible for writing the result into a separate output buffer.
pub fn reuse_spatial(
    scene: &impl Scene,
    settings: &Settings,
    ctx: &SpatialContext<'_>,
    noise: &mut Noise,
) -> DiReservoir {
    let center_surface = &ctx.surfaces[ctx.center_idx];

    if center_surface.is_none() {
        return ctx.reservoirs[ctx.center_idx];
    }

    let mut reservoir = DiReservoir::default();
    let mut selected_slot = 0;

    for k in 0..ctx.slots() {
        let Some(idx) = ctx.accepted(k) else {
            continue;
        };

        let neighbor = &ctx.reservoirs[idx];

        if neighbor.ucw <= 0.0 {
            reservoir.m += neighbor.m;
            continue;
        }

        let (target_function, jacobian) = if idx == ctx.center_idx {
            // Resampling our own sample at our own surface; the cached value
            // still holds and there is no domain shift
            (neighbor.sample.target_function, 1.0)
        } else {
            let jacobian = reconnection_jacobian(
                scene,
                &neighbor.sample.light,
                center_surface.point,
                ctx.surfaces[idx].point,
                settings.spatial.jacobian_max_ratio,
            );

            let Some(jacobian) = jacobian else {
                reservoir.m += neighbor.m;
                continue;
            };

            let target_function = eval_target_function(
                scene,
                &neighbor.sample.light,
                center_surface,
                settings.spatial.use_visibility,
            );

            (target_function, jacobian)
        };

        let mis_weight = if target_function > 0.0 {
            settings.bias_correction.resampling_mis_weight(
                scene,
                ctx,
                &neighbor.sample.light,
                k,
                idx,
                settings.spatial.bias_visibility,
            )
        } else {
            0.0
        };

        if reservoir.combine(noise, neighbor, mis_weight, target_function, jacobian)
        {
            reservoir.sample.target_function = target_function;
            selected_slot = k;
        }
    }

    let (nume, denom) = settings.bias_correction.normalization(
        scene,
        ctx,
        &reservoir,
        selected_slot,
        settings.spatial.bias_visibility,
    );

    reservoir.finalize_normalized(reservoir.sample.target_function, nume, denom);
    reservoir.clamp_m(settings.m_cap);
    reservoir
}
