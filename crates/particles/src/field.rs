//! The resource-owning particle field and the host that rebuilds it.
//!
//! A [`ParticleField`] is one generation: buffers, program, camera and GPU
//! state created together and released together. Nothing in a live field is
//! ever reshaped; [`FieldHost::reconfigure`] disposes the old generation before
//! creating the next one.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::window::Window;

use crate::buffer::ParticleBuffer;
use crate::gpu::{CapabilityError, GpuState};
use crate::palette::Palette;
use crate::render_loop::{FrameOutcome, FramePacer, FrameRequest, RenderLoop};
use crate::types::{ParticleOptions, RendererConfig};

/// Paces frames through winit redraw requests.
///
/// winit cannot revoke a queued redraw; cancelling only forgets the request
/// and the disposed loop ignores the callback when it arrives.
pub(crate) struct WindowPacer {
    window: Arc<Window>,
    next: u64,
    outstanding: Option<FrameRequest>,
}

impl WindowPacer {
    fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next: 0,
            outstanding: None,
        }
    }
}

impl FramePacer for WindowPacer {
    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next);
        self.next = self.next.wrapping_add(1);
        self.outstanding = Some(request);
        self.window.request_redraw();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.outstanding == Some(request) {
            self.outstanding = None;
        }
    }
}

/// Rejects option combinations that cannot produce a field.
///
/// Malformed colours are not checked here; they fall back to white.
pub fn validate_options(options: &ParticleOptions) -> Result<()> {
    if options.particle_count == 0 {
        bail!("particle count must be greater than zero");
    }
    if !options.particle_spread.is_finite() || options.particle_spread <= 0.0 {
        bail!(
            "particle spread must be a positive number (got {})",
            options.particle_spread
        );
    }
    if !(0.0..=1.0).contains(&options.size_randomness) {
        bail!(
            "size randomness must lie in [0, 1] (got {})",
            options.size_randomness
        );
    }
    Ok(())
}

/// Generates the immutable attribute arrays for `options`.
pub fn generate_particles(options: &ParticleOptions) -> ParticleBuffer {
    let palette = Palette::resolve(options.particle_colors.as_deref());
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    ParticleBuffer::generate(
        options.particle_count,
        options.particle_spread,
        options.size_randomness,
        &palette,
        &mut rng,
    )
}

/// One live particle field drawing into a window.
pub struct ParticleField {
    render_loop: RenderLoop<GpuState, WindowPacer>,
    config: RendererConfig,
    // Dropped after `render_loop`; the surface was created from this window.
    window: Arc<Window>,
}

impl ParticleField {
    /// Builds buffers, program, camera and GPU state, then starts the loop.
    ///
    /// Returns `Ok(None)` when no usable GPU is available; the caller simply
    /// renders nothing. Every other failure is returned.
    pub fn create(window: Arc<Window>, config: &RendererConfig) -> Result<Option<Self>> {
        let options = &config.options;
        validate_options(options)?;

        let particles = generate_particles(options);
        let size = window.inner_size();

        let gpu = match GpuState::new(
            window.as_ref(),
            size,
            config.antialiasing,
            config.surface_alpha,
            &particles,
        ) {
            Ok(gpu) => gpu,
            Err(err) => {
                if let Some(capability) = err.downcast_ref::<CapabilityError>() {
                    tracing::warn!(error = %capability, "GPU rendering unavailable; particle field disabled");
                    return Ok(None);
                }
                return Err(err.context("failed to initialise particle renderer"));
            }
        };

        // Pointer events pass through to whatever sits underneath unless the
        // field has to observe them for hover.
        if let Err(err) = window.set_cursor_hittest(options.move_particles_on_hover) {
            tracing::debug!(error = %err, "cursor hit-test control unavailable");
        }

        let pacer = WindowPacer::new(window.clone());
        let mut render_loop = RenderLoop::new(gpu, pacer, options, &config.policy, size);
        render_loop.start(Instant::now());

        tracing::info!(
            count = options.particle_count,
            spread = options.particle_spread,
            hover = options.move_particles_on_hover,
            rotation = !options.disable_rotation,
            policy = ?config.policy,
            "particle field created"
        );

        Ok(Some(Self {
            render_loop,
            config: config.clone(),
            window,
        }))
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.render_loop.size()
    }

    pub fn pointer_moved(&mut self, position: PhysicalPosition<f64>) {
        self.render_loop.pointer_moved(position);
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.render_loop.resize(size);
    }

    pub fn redraw(&mut self, now: Instant) -> Result<FrameOutcome, wgpu::SurfaceError> {
        self.render_loop.frame(now)
    }

    /// Reconfigures the swapchain at the current size after `Lost`/`Outdated`.
    pub fn recover_surface(&mut self) {
        self.render_loop.reconfigure_surface();
    }

    /// Tears the field down: pending frame cancelled, input detached, GPU
    /// resources released.
    pub fn dispose(mut self) {
        self.render_loop.dispose();
        tracing::info!("particle field disposed");
    }
}

/// True when `next` describes a different field than the live one.
pub fn needs_rebuild(current: Option<&RendererConfig>, next: &RendererConfig) -> bool {
    current != Some(next)
}

/// Owns at most one [`ParticleField`] for a window and replaces it wholesale
/// when the configuration changes.
pub struct FieldHost {
    window: Arc<Window>,
    field: Option<ParticleField>,
    config: Option<RendererConfig>,
}

impl FieldHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            field: None,
            config: None,
        }
    }

    /// Creates the first field. Returns whether anything is being rendered.
    pub fn mount(&mut self, config: &RendererConfig) -> Result<bool> {
        self.unmount();
        self.config = Some(config.clone());
        self.field = ParticleField::create(self.window.clone(), config)?;
        Ok(self.field.is_some())
    }

    /// Disposes the live field and creates a new one, but only when `config`
    /// differs from the one last mounted. Returns whether a rebuild happened.
    pub fn reconfigure(&mut self, config: &RendererConfig) -> Result<bool> {
        if !needs_rebuild(self.config.as_ref(), config) {
            return Ok(false);
        }
        self.mount(config)?;
        Ok(true)
    }

    pub fn unmount(&mut self) {
        if let Some(field) = self.field.take() {
            field.dispose();
        }
    }

    pub fn is_rendering(&self) -> bool {
        self.field.is_some()
    }

    pub fn field_mut(&mut self) -> Option<&mut ParticleField> {
        self.field.as_mut()
    }

    pub fn pointer_moved(&mut self, position: PhysicalPosition<f64>) {
        if let Some(field) = self.field.as_mut() {
            field.pointer_moved(position);
        }
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(field) = self.field.as_mut() {
            field.resize(size);
        }
    }

    pub fn redraw(&mut self, now: Instant) -> Option<Result<FrameOutcome, wgpu::SurfaceError>> {
        self.field.as_mut().map(|field| field.redraw(now))
    }

    pub fn recover_surface(&mut self) {
        if let Some(field) = self.field.as_mut() {
            field.recover_surface();
        }
    }
}

impl Drop for FieldHost {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RenderPolicy;

    #[test]
    fn validation_rejects_empty_or_degenerate_fields() {
        assert!(validate_options(&ParticleOptions::default()).is_ok());

        let zero = ParticleOptions {
            particle_count: 0,
            ..ParticleOptions::default()
        };
        assert!(validate_options(&zero).is_err());

        for spread in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let options = ParticleOptions {
                particle_spread: spread,
                ..ParticleOptions::default()
            };
            assert!(validate_options(&options).is_err(), "spread {spread} accepted");
        }

        let jitter = ParticleOptions {
            size_randomness: 1.5,
            ..ParticleOptions::default()
        };
        assert!(validate_options(&jitter).is_err());
    }

    #[test]
    fn malformed_colors_do_not_fail_validation() {
        let options = ParticleOptions {
            particle_colors: Some(vec!["definitely not hex".to_string()]),
            ..ParticleOptions::default()
        };
        assert!(validate_options(&options).is_ok());

        let particles = generate_particles(&ParticleOptions {
            particle_count: 8,
            seed: Some(1),
            ..options
        });
        assert!(particles.colors().iter().all(|channel| *channel == 1.0));
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let options = ParticleOptions {
            particle_count: 16,
            seed: Some(99),
            ..ParticleOptions::default()
        };
        let first = generate_particles(&options);
        let second = generate_particles(&options);
        assert_eq!(first.positions(), second.positions());
        assert_eq!(first.seeds(), second.seeds());
        assert_eq!(first.colors(), second.colors());
    }

    #[test]
    fn rebuild_only_when_configuration_differs() {
        let config = RendererConfig::default();
        assert!(needs_rebuild(None, &config));
        assert!(!needs_rebuild(Some(&config), &config.clone()));

        let mut recoloured = config.clone();
        recoloured.options.particle_colors = Some(vec!["#ff0000".to_string()]);
        assert!(needs_rebuild(Some(&config), &recoloured));

        let mut still = config.clone();
        still.policy = RenderPolicy::Still { time: 1.0 };
        assert!(needs_rebuild(Some(&config), &still));
    }
}
