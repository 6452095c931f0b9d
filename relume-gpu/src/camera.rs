use bytemuck::{Pod, Zeroable};
use glam::{vec2, Mat4, UVec2, Vec2, Vec3, Vec4, Vec4Swizzles};

/// Pinhole camera; both the geometry pass and temporal reprojection go
/// through this.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct Camera {
    pub projection_view: Mat4,
    pub ndc_to_world: Mat4,
    pub origin: Vec3,
    _pad0: f32,
    pub screen: UVec2,
    _pad1: [u32; 2],
}

impl Camera {
    pub fn new(
        origin: Vec3,
        look_at: Vec3,
        up: Vec3,
        fov_y: f32,
        screen: UVec2,
    ) -> Self {
        let aspect = (screen.x as f32) / (screen.y as f32);
        let projection = Mat4::perspective_rh(fov_y, aspect, 0.01, 1000.0);
        let view = Mat4::look_at_rh(origin, look_at, up);
        let projection_view = projection * view;

        Self {
            projection_view,
            ndc_to_world: projection_view.inverse(),
            origin,
            _pad0: 0.0,
            screen,
            _pad1: [0; 2],
        }
    }

    /// Given a point in world-coordinates, returns it in clip-coordinates.
    pub fn world_to_clip(&self, pos: Vec3) -> Vec4 {
        self.projection_view * pos.extend(1.0)
    }

    /// Given a point in world-coordinates, returns it in screen-coordinates;
    /// `None` for points behind the camera.
    pub fn world_to_screen(&self, pos: Vec3) -> Option<Vec2> {
        let clip = self.world_to_clip(pos);

        if clip.w <= 0.0 {
            return None;
        }

        let ndc = clip.xy() / clip.w;
        let ndc = vec2(ndc.x, -ndc.y);

        Some((0.5 * ndc + 0.5) * self.screen.as_vec2() - 0.5)
    }

    /// Given a point in screen-coordinates, returns a unique index for it;
    /// used to index all per-pixel buffers.
    pub fn screen_to_idx(&self, pos: UVec2) -> usize {
        (pos.y * self.screen.x + pos.x) as usize
    }

    pub fn idx_to_screen(&self, idx: usize) -> UVec2 {
        UVec2::new((idx as u32) % self.screen.x, (idx as u32) / self.screen.x)
    }

    pub fn pixel_count(&self) -> usize {
        (self.screen.x * self.screen.y) as usize
    }

    /// Casts a ray through the center of given pixel; returns the (origin,
    /// unit direction) pair.
    pub fn ray(&self, screen_pos: UVec2) -> (Vec3, Vec3) {
        let ndc =
            (screen_pos.as_vec2() + 0.5) * 2.0 / self.screen.as_vec2() - 1.0;
        let ndc = vec2(ndc.x, -ndc.y);

        let target = self.ndc_to_world.project_point3(ndc.extend(0.5));

        (self.origin, (target - self.origin).normalize())
    }
}
