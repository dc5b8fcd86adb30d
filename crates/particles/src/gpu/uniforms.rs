use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use winit::dpi::PhysicalSize;

use crate::camera::Camera;
use crate::program::UniformState;

/// std140 image of the `FieldParams` block declared in both shader stages.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FieldUniforms {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub mouse: [f32; 2],
    /// Drawable size in physical pixels; sprites are sized against it.
    pub viewport: [f32; 2],
    pub time: f32,
    pub speed: f32,
    pub size: f32,
    pub hover_factor: f32,
    pub move_on_hover: u32,
    pub alpha_particles: u32,
    pub _padding: [u32; 2],
}

impl FieldUniforms {
    /// Packs one frame's uniform values.
    ///
    /// `model` is the mesh transform (the tumble rotation); the camera view is
    /// folded into `model_view`.
    pub fn compose(
        state: &UniformState,
        model: Mat4,
        camera: &Camera,
        viewport: PhysicalSize<u32>,
    ) -> Self {
        Self {
            model_view: (camera.view() * model).to_cols_array_2d(),
            projection: camera.projection().to_cols_array_2d(),
            mouse: state.mouse.to_array(),
            viewport: [viewport.width.max(1) as f32, viewport.height.max(1) as f32],
            time: state.time,
            speed: state.speed,
            size: state.base_size,
            hover_factor: state.hover_factor,
            move_on_hover: u32::from(state.move_on_hover),
            alpha_particles: u32::from(state.alpha_particles),
            _padding: [0; 2],
        }
    }
}
