use crate::runtime::RenderPolicy;

/// User-facing knobs for one particle field generation.
///
/// Changing any of these requires tearing the field down and creating it
/// again; nothing here is applied to live GPU buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleOptions {
    /// Number of particles generated at start-up.
    pub particle_count: u32,
    /// Edge length of the cube particles are scattered in; also scales pointer influence.
    pub particle_spread: f32,
    /// Multiplier applied to elapsed time before it drives the drift.
    pub speed: f32,
    /// `#RRGGBB` palette entries; `None` or an empty list selects the default palette.
    pub particle_colors: Option<Vec<String>>,
    /// Track the pointer and pull particles towards it.
    pub move_particles_on_hover: bool,
    pub particle_hover_factor: f32,
    /// Fade sprites out towards their rim instead of drawing flat discs.
    pub alpha_particles: bool,
    /// Point size in pixels at unit view depth before per-particle jitter.
    pub particle_base_size: f32,
    /// Spread of the per-particle size jitter, in `[0, 1]`.
    pub size_randomness: f32,
    pub camera_distance: f32,
    pub disable_rotation: bool,
    /// Seed for attribute generation; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for ParticleOptions {
    fn default() -> Self {
        Self {
            particle_count: 150,
            particle_spread: 15.0,
            speed: 0.1,
            particle_colors: None,
            move_particles_on_hover: true,
            particle_hover_factor: 1.0,
            alpha_particles: true,
            particle_base_size: 80.0,
            size_randomness: 1.0,
            camera_distance: 20.0,
            disable_rotation: false,
            seed: None,
        }
    }
}

/// Declares how the compositor should treat the swapchain alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceAlpha {
    /// Frames fully cover whatever sits behind the window.
    Opaque,
    /// Cleared pixels stay see-through so the particles float over the desktop.
    #[default]
    Transparent,
}

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Immutable configuration passed to the renderer at start-up.
///
/// Two configs comparing equal describe the same field; the host uses that
/// to decide whether a reload needs a full rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Initial window size in physical pixels.
    pub surface_size: (u32, u32),
    pub title: String,
    pub options: ParticleOptions,
    pub antialiasing: Antialiasing,
    pub surface_alpha: SurfaceAlpha,
    /// Continuous animation or a single still frame.
    pub policy: RenderPolicy,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1920, 1080),
            title: "particlewall".to_string(),
            options: ParticleOptions::default(),
            antialiasing: Antialiasing::default(),
            surface_alpha: SurfaceAlpha::default(),
            policy: RenderPolicy::default(),
        }
    }
}
