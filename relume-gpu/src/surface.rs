use glam::Vec3;

/// Snapshot of a pixel's first-hit shading data, as produced by the geometry
/// pass; everything target-function evaluation needs to re-weigh a light
/// sample at this pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Surface {
    pub point: Vec3,
    pub normal: Vec3,
    pub view_direction: Vec3,
    pub base_color: Vec3,
    pub roughness: f32,

    /// Distance from the camera; `0.0` means the primary ray missed and the
    /// pixel has no surface at all.
    pub depth: f32,
}

impl Surface {
    pub fn is_some(&self) -> bool {
        self.depth > 0.0
    }

    pub fn is_none(&self) -> bool {
        !self.is_some()
    }
}

/// Similarity heuristics deciding whether a neighboring surface is close
/// enough, geometrically and material-wise, for its samples to be reused.
///
/// Each heuristic can be toggled independently; a neighbor is acceptable only
/// when all enabled heuristics pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimilarityHeuristics {
    /// Rejects neighbors whose shading point lies further than this from the
    /// plane of the center surface.
    pub use_plane_distance: bool,
    pub plane_distance_threshold: f32,

    /// Rejects neighbors whose normal diverges from the center normal, i.e.
    /// whose cosine falls below this threshold.
    pub use_normal: bool,
    pub normal_threshold: f32,

    /// Rejects neighbors whose roughness differs from the center roughness
    /// by more than this.
    pub use_roughness: bool,
    pub roughness_threshold: f32,
}

impl SimilarityHeuristics {
    pub fn check(&self, center: &Surface, neighbor: &Surface) -> bool {
        self.check_plane_distance(center, neighbor)
            && self.check_normal(center, neighbor)
            && self.check_roughness(center, neighbor)
    }

    fn check_plane_distance(&self, center: &Surface, neighbor: &Surface) -> bool {
        if !self.use_plane_distance {
            return true;
        }

        let to_neighbor = neighbor.point - center.point;
        let distance_to_plane = to_neighbor.dot(center.normal).abs();

        distance_to_plane < self.plane_distance_threshold
    }

    fn check_normal(&self, center: &Surface, neighbor: &Surface) -> bool {
        if !self.use_normal {
            return true;
        }

        center.normal.dot(neighbor.normal) > self.normal_threshold
    }

    fn check_roughness(&self, center: &Surface, neighbor: &Surface) -> bool {
        if !self.use_roughness {
            return true;
        }

        (neighbor.roughness - center.roughness).abs()
            < self.roughness_threshold
    }
}

impl Default for SimilarityHeuristics {
    fn default() -> Self {
        Self {
            use_plane_distance: true,
            plane_distance_threshold: 0.1,
            use_normal: true,
            normal_threshold: 0.906, // cos(25°)
            use_roughness: false,
            roughness_threshold: 0.25,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;

    fn surface(point: Vec3, normal: Vec3, roughness: f32) -> Surface {
        Surface {
            point,
            normal,
            view_direction: vec3(0.0, 0.0, 1.0),
            base_color: Vec3::ONE,
            roughness,
            depth: 1.0,
        }
    }

    #[test]
    fn surfaces_pass_their_own_heuristics() {
        let heuristics = SimilarityHeuristics::default();
        let center = surface(vec3(1.0, 2.0, 3.0), vec3(0.0, 1.0, 0.0), 0.5);

        assert!(heuristics.check(&center, &center));
    }

    #[test]
    fn plane_distance() {
        let heuristics = SimilarityHeuristics {
            use_plane_distance: true,
            use_normal: false,
            use_roughness: false,
            ..SimilarityHeuristics::default()
        };

        let center = surface(Vec3::ZERO, vec3(0.0, 1.0, 0.0), 0.5);

        // Same plane, far away laterally: acceptable
        let coplanar = surface(vec3(5.0, 0.0, 5.0), vec3(0.0, 1.0, 0.0), 0.5);
        assert!(heuristics.check(&center, &coplanar));

        // Off-plane: rejected
        let off_plane = surface(vec3(0.0, 0.5, 0.0), vec3(0.0, 1.0, 0.0), 0.5);
        assert!(!heuristics.check(&center, &off_plane));

        // ... unless the heuristic is disabled
        let disabled = SimilarityHeuristics {
            use_plane_distance: false,
            ..heuristics
        };

        assert!(disabled.check(&center, &off_plane));
    }

    #[test]
    fn normal_similarity() {
        let heuristics = SimilarityHeuristics {
            use_plane_distance: false,
            use_normal: true,
            use_roughness: false,
            ..SimilarityHeuristics::default()
        };

        let center = surface(Vec3::ZERO, vec3(0.0, 1.0, 0.0), 0.5);
        let tilted = surface(Vec3::ZERO, vec3(0.0, 0.0, 1.0), 0.5);

        assert!(!heuristics.check(&center, &tilted));
    }

    #[test]
    fn roughness_similarity() {
        let heuristics = SimilarityHeuristics {
            use_plane_distance: false,
            use_normal: false,
            use_roughness: true,
            ..SimilarityHeuristics::default()
        };

        let center = surface(Vec3::ZERO, vec3(0.0, 1.0, 0.0), 0.1);
        let glossy = surface(Vec3::ZERO, vec3(0.0, 1.0, 0.0), 0.8);

        assert!(!heuristics.check(&center, &glossy));
    }
}
