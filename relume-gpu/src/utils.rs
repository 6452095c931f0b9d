use glam::{vec3, Vec3};

pub trait F32Ext
where
    Self: Sized,
{
    fn sqr(self) -> Self;
}

impl F32Ext for f32 {
    fn sqr(self) -> Self {
        self * self
    }
}

pub trait Vec3Ext
where
    Self: Sized,
{
    /// Returns luminance of this color-vector; this is the scalar that target
    /// functions and resampling weights are reduced to.
    fn luma(self) -> f32;
}

impl Vec3Ext for Vec3 {
    fn luma(self) -> f32 {
        self.dot(vec3(0.2126, 0.7152, 0.0722))
    }
}
