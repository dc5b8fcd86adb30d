use glam::{Mat4, Vec3};

pub const DEFAULT_FOV_DEGREES: f32 = 45.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 100.0;

/// Static perspective camera on the +Z axis looking at the origin.
///
/// Only the aspect ratio changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    position: Vec3,
}

impl Camera {
    pub fn new(distance: f32) -> Self {
        Self {
            fov_y: DEFAULT_FOV_DEGREES.to_radians(),
            aspect: 1.0,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            position: Vec3::new(0.0, 0.0, distance),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// World-to-view transform; the camera never rotates, so this is a pure translation.
    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }

    /// Right-handed projection with wgpu's `[0, 1]` depth range.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }
}
