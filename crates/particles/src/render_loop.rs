//! The per-frame driver.
//!
//! [`RenderLoop`] owns everything one field generation needs on the CPU side
//! (program, camera, input, resize state, time source) plus the GPU target it
//! draws into. It is generic over the target and the frame scheduler so the
//! lifecycle can be exercised without a device.

use std::time::{Duration, Instant};

use winit::dpi::{PhysicalPosition, PhysicalSize};

use crate::camera::Camera;
use crate::gpu::uniforms::FieldUniforms;
use crate::input::{InputTracker, SurfaceRect};
use crate::program::{MeshRotation, ShaderProgram};
use crate::resize::ResizeHandler;
use crate::runtime::{time_source_for_policy, BoxedTimeSource, RenderPolicy};
use crate::types::ParticleOptions;

/// Handle for one outstanding frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Host-side frame pacing, one request per display frame.
pub trait FramePacer {
    fn request_frame(&mut self) -> FrameRequest;
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Where frames end up. Implemented by the GPU state and by test doubles.
pub trait FrameTarget {
    fn resize(&mut self, size: PhysicalSize<u32>);
    fn write_uniforms(&mut self, uniforms: &FieldUniforms);
    fn draw(&mut self) -> Result<(), wgpu::SurfaceError>;
    /// Frees GPU resources. Called exactly once, after the last draw.
    fn release(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Drawn,
    /// The loop was disposed; nothing was written or drawn.
    Skipped,
}

/// Once-per-second frame rate logging.
#[derive(Debug, Default)]
struct FrameStats {
    window_start: Option<Instant>,
    frames: u32,
}

impl FrameStats {
    fn record(&mut self, now: Instant, frame_index: u64, time: f32) {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        let elapsed = now.saturating_duration_since(start);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames as f32 / elapsed.as_secs_f32();
            tracing::debug!(fps = fps.round(), frame_index, time, "render stats");
            self.frames = 0;
            self.window_start = Some(now);
        }
    }
}

/// Frame rate a still render assumes when turning its fixed time into a
/// rotation step count.
const STILL_FRAME_RATE: f32 = 60.0;

/// Rotation steps for a still frame; depends on `seconds` only, so redraws
/// of the same still are identical.
fn still_rotation_frames(seconds: f32) -> u64 {
    (seconds.max(0.0) * STILL_FRAME_RATE).round() as u64
}

pub struct RenderLoop<T: FrameTarget, P: FramePacer> {
    target: Option<T>,
    pacer: P,
    pending: Option<FrameRequest>,
    state: LoopState,
    program: ShaderProgram,
    camera: Camera,
    resize: ResizeHandler,
    input: Option<InputTracker>,
    spread: f32,
    rotate: bool,
    continuous: bool,
    time_source: BoxedTimeSource,
    rotation_frames: u64,
    stats: FrameStats,
}

impl<T: FrameTarget, P: FramePacer> RenderLoop<T, P> {
    pub fn new(
        target: T,
        pacer: P,
        options: &ParticleOptions,
        policy: &RenderPolicy,
        size: PhysicalSize<u32>,
    ) -> Self {
        let mut camera = Camera::new(options.camera_distance);
        let resize = ResizeHandler::new(size, &mut camera);
        let input = options
            .move_particles_on_hover
            .then(|| InputTracker::new(size));

        Self {
            target: Some(target),
            pacer,
            pending: None,
            state: LoopState::Running,
            program: ShaderProgram::new(options),
            camera,
            resize,
            input,
            spread: options.particle_spread,
            rotate: !options.disable_rotation,
            continuous: policy.is_continuous(),
            time_source: time_source_for_policy(policy),
            rotation_frames: 0,
            stats: FrameStats::default(),
        }
    }

    /// Starts the clock and schedules the first frame.
    pub fn start(&mut self, now: Instant) {
        if self.state != LoopState::Running {
            return;
        }
        self.time_source.reset(now);
        self.schedule();
    }

    fn schedule(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.pacer.request_frame());
        }
    }

    pub fn pointer_moved(&mut self, position: PhysicalPosition<f64>) {
        let Some(input) = self.input.as_mut() else {
            return;
        };
        input.handle_pointer(position);
        if !self.continuous {
            self.schedule();
        }
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if self.state != LoopState::Running {
            return;
        }
        let Some(size) = self.resize.apply(size, &mut self.camera) else {
            return;
        };
        if let Some(target) = self.target.as_mut() {
            target.resize(size);
        }
        if let Some(input) = self.input.as_mut() {
            input.set_rect(SurfaceRect::from_size(size));
        }
        if !self.continuous {
            self.schedule();
        }
    }

    /// Re-applies the last known size to the target, e.g. after the surface was lost.
    pub fn reconfigure_surface(&mut self) {
        if self.state != LoopState::Running {
            return;
        }
        let size = self.resize.size();
        if let Some(target) = self.target.as_mut() {
            target.resize(size);
        }
        self.schedule();
    }

    /// Runs one render step: schedule the next frame, advance time and
    /// rotation, write uniforms, then draw.
    pub fn frame(&mut self, now: Instant) -> Result<FrameOutcome, wgpu::SurfaceError> {
        if self.state != LoopState::Running {
            return Ok(FrameOutcome::Skipped);
        }
        let Some(target) = self.target.as_mut() else {
            return Ok(FrameOutcome::Skipped);
        };

        self.pending = None;
        if self.continuous {
            self.pending = Some(self.pacer.request_frame());
        }

        let sample = self.time_source.sample(now);
        self.program.set_time(sample.seconds);
        if let Some(input) = self.input.as_ref() {
            self.program.set_mouse(input.mouse_uniform(self.spread));
        }
        if self.rotate {
            self.rotation_frames = if self.continuous {
                self.rotation_frames + 1
            } else {
                still_rotation_frames(sample.seconds)
            };
        }

        let uniforms = FieldUniforms::compose(
            self.program.uniforms(),
            MeshRotation::at_frame(self.rotation_frames).matrix(),
            &self.camera,
            self.resize.size(),
        );
        target.write_uniforms(&uniforms);
        let drawn = target.draw();
        if let Err(err) = drawn {
            // Still loops only draw on request.
            if !self.continuous {
                self.schedule();
            }
            return Err(err);
        }

        self.stats.record(now, sample.frame_index, sample.seconds);
        Ok(FrameOutcome::Drawn)
    }

    /// Cancels the pending frame, stops input tracking, then releases the target.
    ///
    /// Idempotent; nothing is written or drawn afterwards.
    pub fn dispose(&mut self) {
        if self.state == LoopState::Disposed {
            return;
        }
        if let Some(request) = self.pending.take() {
            self.pacer.cancel_frame(request);
        }
        self.state = LoopState::Disposed;
        self.input = None;
        if let Some(mut target) = self.target.take() {
            target.release();
        }
        tracing::debug!("render loop disposed");
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn rotation(&self) -> MeshRotation {
        MeshRotation::at_frame(self.rotation_frames)
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.resize.size()
    }

    pub fn tracks_pointer(&self) -> bool {
        self.input.is_some()
    }
}

impl<T: FrameTarget, P: FramePacer> Drop for RenderLoop<T, P> {
    fn drop(&mut self) {
        self.dispose();
    }
}
