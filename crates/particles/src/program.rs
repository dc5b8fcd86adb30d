//! CPU-side view of the particle shading program.
//!
//! The GPU evaluates the same math in [`crate::compile`]; the functions here
//! mirror it so the animation can be reasoned about and tested without a
//! device. Everything is a pure function of time, seed and uniforms.

use glam::{Mat4, Vec2, Vec3};

use crate::types::ParticleOptions;

/// Drift amplitude relative to the seed component.
pub const DRIFT_AMPLITUDE: f32 = 0.5;
/// Phase spread applied to seeds before they enter `sin`/`cos`.
pub const DRIFT_PHASE_SCALE: f32 = 10.0;
/// Damping applied on top of the configured hover factor.
pub const HOVER_DAMPING: f32 = 0.1;
/// Constant translucency multiplied into every sprite's alpha.
pub const SPRITE_OPACITY: f32 = 0.8;
/// Yaw advance per rotated frame, in radians.
pub const YAW_STEP: f32 = 0.001;
/// Pitch advance per rotated frame, in radians.
pub const PITCH_STEP: f32 = YAW_STEP * 0.5;

/// Mutable uniform values read by both stages every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformState {
    pub time: f32,
    /// Pointer in world units, already scaled by `spread * 0.5`.
    pub mouse: Vec2,
    pub speed: f32,
    pub base_size: f32,
    pub hover_factor: f32,
    pub move_on_hover: bool,
    pub alpha_particles: bool,
}

impl UniformState {
    pub fn from_options(options: &ParticleOptions) -> Self {
        Self {
            time: 0.0,
            mouse: Vec2::ZERO,
            speed: options.speed,
            base_size: options.particle_base_size,
            hover_factor: options.particle_hover_factor,
            move_on_hover: options.move_particles_on_hover,
            alpha_particles: options.alpha_particles,
        }
    }
}

/// Owns the uniform set for one field generation.
///
/// Only `time` and `mouse` change after creation; the rest is fixed by the
/// options the field was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderProgram {
    uniforms: UniformState,
}

impl ShaderProgram {
    pub fn new(options: &ParticleOptions) -> Self {
        Self {
            uniforms: UniformState::from_options(options),
        }
    }

    pub fn uniforms(&self) -> &UniformState {
        &self.uniforms
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.uniforms.time = seconds;
    }

    pub fn set_mouse(&mut self, mouse: Vec2) {
        self.uniforms.mouse = mouse;
    }

    /// Where a particle is drawn in model space under the current uniforms.
    pub fn display_position(&self, position: Vec3, seed: Vec3) -> Vec3 {
        display_position(&self.uniforms, position, seed)
    }
}

/// Floating offset added to a particle's rest position.
pub fn drift_offset(time: f32, speed: f32, seed: Vec3) -> Vec3 {
    let phase = time * speed;
    Vec3::new(
        (phase + seed.x * DRIFT_PHASE_SCALE).sin() * seed.x * DRIFT_AMPLITUDE,
        (phase + seed.y * DRIFT_PHASE_SCALE).cos() * seed.y * DRIFT_AMPLITUDE,
        (phase + seed.z * DRIFT_PHASE_SCALE).sin() * seed.z * DRIFT_AMPLITUDE,
    )
}

/// Pull towards the pointer for a particle already displaced by drift.
///
/// Always zero when hover is disabled, whatever `mouse` holds.
pub fn hover_displacement(
    mouse: Vec2,
    position: Vec3,
    seed: Vec3,
    hover_factor: f32,
    enabled: bool,
) -> Vec2 {
    if !enabled {
        return Vec2::ZERO;
    }
    let influence = (mouse - position.truncate()) * hover_factor * HOVER_DAMPING;
    influence * seed.truncate()
}

pub fn display_position(uniforms: &UniformState, position: Vec3, seed: Vec3) -> Vec3 {
    let drifted = position + drift_offset(uniforms.time, uniforms.speed, seed);
    let hover = hover_displacement(
        uniforms.mouse,
        drifted,
        seed,
        uniforms.hover_factor,
        uniforms.move_on_hover,
    );
    drifted + hover.extend(0.0)
}

/// Perspective-attenuated sprite size in pixels.
///
/// `view_depth` is the view-space z, negative in front of the camera.
pub fn point_size(base_size: f32, seed_z: f32, view_depth: f32) -> f32 {
    base_size * seed_z * (1.0 / -view_depth)
}

/// Fragment alpha for a point inside the sprite square, or `None` when the
/// fragment falls outside the disc and is discarded.
pub fn sprite_alpha(point_coord: Vec2, alpha_particles: bool) -> Option<f32> {
    let distance = point_coord.distance(Vec2::splat(0.5));
    if distance > 0.5 {
        return None;
    }
    let alpha = if alpha_particles {
        1.0 - distance * 2.0
    } else {
        1.0
    };
    Some(alpha * SPRITE_OPACITY)
}

/// Rigid tumble applied to the whole mesh.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeshRotation {
    pub yaw: f32,
    pub pitch: f32,
}

impl MeshRotation {
    /// Rotation after `frames` rotated frames.
    pub fn at_frame(frames: u64) -> Self {
        let frames = frames as f64;
        Self {
            yaw: (frames * YAW_STEP as f64) as f32,
            pitch: (frames * PITCH_STEP as f64) as f32,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.yaw) * Mat4::from_rotation_x(self.pitch)
    }

    pub fn is_identity(&self) -> bool {
        self.yaw == 0.0 && self.pitch == 0.0
    }
}
