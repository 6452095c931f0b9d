use crate::Noise;

/// Weighted-sample reservoir.
///
/// Holds the single sample that survived weighted reservoir sampling so far,
/// together with the bookkeeping needed to combine reservoirs without
/// introducing bias:
///
/// - `w_sum` is the running sum of resampling weights,
/// - `ucw` is the unbiased contribution weight, i.e. the scalar such that
///   `sample_radiance * ucw` estimates the pixel's direct-lighting integral
///   (`ucw <= 0.0` means "no valid sample"),
/// - `m` is the confidence count: how many original candidates this
///   reservoir logically represents.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reservoir<T> {
    pub sample: T,
    pub w_sum: f32,
    pub ucw: f32,
    pub m: f32,
}

impl<T> Reservoir<T>
where
    T: Clone + Copy,
{
    /// Considers a fresh candidate with given resampling weight; returns
    /// whether the candidate got retained.
    pub fn add_candidate(
        &mut self,
        noise: &mut Noise,
        sample: T,
        weight: f32,
    ) -> bool {
        self.m += 1.0;
        self.w_sum += weight;

        if weight > 0.0 && noise.sample() * self.w_sum <= weight {
            self.sample = sample;
            true
        } else {
            false
        }
    }

    /// Combines another reservoir into this one.
    ///
    /// The other reservoir participates with weight
    /// `mis_weight * target_function * jacobian * rhs.ucw`; its confidence is
    /// always absorbed, even when the weight comes out zero. Returns whether
    /// the other reservoir's sample got retained - the caller is responsible
    /// for re-caching the target function on the retained sample, since that
    /// value now refers to the caller's surface.
    pub fn combine(
        &mut self,
        noise: &mut Noise,
        rhs: &Self,
        mis_weight: f32,
        target_function: f32,
        jacobian: f32,
    ) -> bool {
        let weight = mis_weight * target_function * jacobian * rhs.ucw.max(0.0);

        self.m += rhs.m;
        self.w_sum += weight;

        if weight > 0.0 && noise.sample() * self.w_sum <= weight {
            self.sample = rhs.sample;
            true
        } else {
            false
        }
    }

    /// Turns `w_sum` into the unbiased contribution weight using plain
    /// confidence-weight normalization, i.e. dividing by `m * target_function`
    /// of the retained sample.
    pub fn finalize(&mut self, target_function: f32) {
        let denom = self.m * target_function;

        self.ucw = if denom == 0.0 { 0.0 } else { self.w_sum / denom };
    }

    /// Like [`Self::finalize()`], but scaling by an externally computed
    /// normalization ratio instead of `1 / m`; used by the bias-correction
    /// strategies.
    pub fn finalize_normalized(
        &mut self,
        target_function: f32,
        norm_num: f32,
        norm_denom: f32,
    ) {
        let denom = target_function * norm_denom;

        self.ucw = if denom == 0.0 {
            0.0
        } else {
            (self.w_sum * norm_num) / denom
        };
    }

    /// Caps the confidence count; `0.0` disables the cap.
    pub fn clamp_m(&mut self, max: f32) {
        if max > 0.0 {
            self.m = self.m.min(max);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;

    fn noise(seed: u32) -> Noise {
        Noise::new(seed, uvec2(17, 23), 0)
    }

    #[test]
    fn candidates_survive_proportionally_to_weight() {
        // Chi-squared-style check: over many independent runs, candidate `i`
        // must survive with probability `w_i / sum(w)`.

        let weights = [1.0, 3.0, 0.5, 2.5, 3.0];
        let total: f32 = weights.iter().sum();
        let trials = 20_000;
        let mut hits = [0u32; 5];

        for seed in 0..trials {
            let mut noise = noise(seed);
            let mut reservoir = Reservoir::default();

            for (idx, weight) in weights.iter().enumerate() {
                reservoir.add_candidate(&mut noise, idx, *weight);
            }

            hits[reservoir.sample] += 1;
        }

        let mut chi2 = 0.0;

        for (hits, weight) in hits.iter().zip(&weights) {
            let expected = (trials as f32) * weight / total;

            chi2 += (*hits as f32 - expected).powi(2) / expected;
        }

        // 4 degrees of freedom; p = 0.001 cutoff is ~18.47
        assert!(chi2 < 18.47, "chi2 = {chi2}, hits = {hits:?}");
    }

    #[test]
    fn zero_weight_candidates_are_never_retained() {
        for seed in 0..100 {
            let mut noise = noise(seed);
            let mut reservoir = Reservoir::default();

            reservoir.add_candidate(&mut noise, "good", 1.0);

            for _ in 0..10 {
                assert!(!reservoir.add_candidate(&mut noise, "bad", 0.0));
            }

            assert_eq!("good", reservoir.sample);
        }
    }

    #[test]
    fn combining_accumulates_confidence() {
        let mut noise = noise(0);

        let lhs = Reservoir {
            sample: 1,
            w_sum: 1.0,
            ucw: 1.0,
            m: 10.0,
        };

        let rhs = Reservoir {
            sample: 2,
            w_sum: 123.0,
            ucw: 0.0, // invalid sample; confidence must still count
            m: 32.0,
        };

        let mut out = Reservoir::default();

        out.combine(&mut noise, &lhs, lhs.m, 1.0, 1.0);
        out.combine(&mut noise, &rhs, rhs.m, 1.0, 1.0);

        assert_eq!(42.0, out.m);

        out.clamp_m(30.0);
        assert_eq!(30.0, out.m);

        // Cap of zero means "no cap"
        out.clamp_m(0.0);
        assert_eq!(30.0, out.m);
    }

    #[test]
    fn finalize_follows_the_ucw_definition() {
        let mut reservoir = Reservoir {
            sample: 0,
            w_sum: 12.0,
            ucw: 0.0,
            m: 4.0,
        };

        reservoir.finalize(1.5);
        assert_eq!(2.0, reservoir.ucw);

        reservoir.finalize(0.0);
        assert_eq!(0.0, reservoir.ucw);

        reservoir.finalize_normalized(1.5, 1.0, 4.0);
        assert_eq!(2.0, reservoir.ucw);

        reservoir.finalize_normalized(1.5, 0.0, 0.0);
        assert_eq!(0.0, reservoir.ucw);
    }
}
