//! GPU particle field rendered as a decorative background.
//!
//! Particle attributes are generated once on the CPU; every frame the render
//! loop refreshes a handful of uniforms and the GPU evaluates drift, hover
//! pull, perspective sizing and disc shading per sprite:
//!
//! ```text
//!   ParticleOptions ──▶ Palette ──▶ ParticleBuffer ──▶ GPU vertex buffers
//!          │                                                   │
//!          ▼                                                   ▼
//!   Renderer::run ──▶ FieldHost ──▶ ParticleField ──▶ RenderLoop::frame()
//!          ▲                                                   │
//!          │ cursor / resize / R                               └─▶ write uniforms ─▶ draw
//! ```
//!
//! [`ParticleField`] owns one generation of resources; changing any option
//! means disposing it and creating a new one, which [`FieldHost`] does.
//! When no GPU is available the field is simply not created.

pub mod buffer;
pub mod camera;
mod compile;
pub mod field;
mod gpu;
pub mod input;
pub mod palette;
pub mod program;
pub mod render_loop;
pub mod resize;
pub mod runtime;
pub mod types;
mod window;

pub use buffer::{Particle, ParticleBuffer};
pub use camera::Camera;
pub use field::{FieldHost, ParticleField};
pub use gpu::uniforms::FieldUniforms;
pub use gpu::CapabilityError;
pub use input::{InputTracker, SurfaceRect};
pub use palette::{hex_to_rgb, Palette, Rgb, DEFAULT_PALETTE};
pub use program::{MeshRotation, ShaderProgram, UniformState};
pub use render_loop::{FrameOutcome, FramePacer, FrameRequest, FrameTarget, LoopState, RenderLoop};
pub use resize::ResizeHandler;
pub use runtime::{RenderPolicy, TimeSample, TimeSource};
pub use types::{Antialiasing, ParticleOptions, RendererConfig, SurfaceAlpha};
pub use window::{ConfigReloader, Renderer};
