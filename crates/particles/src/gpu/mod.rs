//! wgpu resources behind the particle field.
//!
//! - `context` owns instance/adapter/device/surface wiring and reconfigures
//!   the swapchain on resize.
//! - `pipeline` builds the instanced point-sprite pipeline from the GLSL stages.
//! - `buffers` uploads the immutable per-particle attribute arrays.
//! - `uniforms` is the std140 mirror of the shaders' uniform block.
//! - `state` glues everything together and implements
//!   [`FrameTarget`](crate::render_loop::FrameTarget).

mod buffers;
mod context;
mod pipeline;
mod state;
pub(crate) mod uniforms;

pub use context::CapabilityError;
pub(crate) use state::GpuState;
