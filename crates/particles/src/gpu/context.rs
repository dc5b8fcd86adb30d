use anyhow::{anyhow, Context as AnyhowContext, Result};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use thiserror::Error;
use wgpu::TextureFormatFeatureFlags;
use winit::dpi::PhysicalSize;

use crate::types::{Antialiasing, SurfaceAlpha};

/// The graphics capability the field needs is not available on this machine.
///
/// Callers treat this as a reason to render nothing rather than a failure.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

pub(crate) struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    pub sample_count: u32,
    pub surface_format: wgpu::TextureFormat,
    _instance: wgpu::Instance,
}

impl GpuContext {
    /// Opens a device and configures a surface for `target`.
    ///
    /// The surface is created from raw handles, so `target` must outlive the
    /// returned context.
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        antialiasing: Antialiasing,
        surface_alpha: SurfaceAlpha,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let window_handle = target
            .window_handle()
            .map_err(|err| anyhow!("failed to acquire window handle: {err}"))?;
        let display_handle = target
            .display_handle()
            .map_err(|err| anyhow!("failed to acquire display handle: {err}"))?;

        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .map_err(CapabilityError::from)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(CapabilityError::from)?;

        let adapter_info = adapter.get_info();
        let is_software = adapter_info.device_type == wgpu::DeviceType::Cpu;
        tracing::debug!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            device_type = ?adapter_info.device_type,
            "selected GPU adapter"
        );

        let limits = adapter.limits();
        let max_dimension = limits.max_texture_dimension_2d;
        let width = initial_size.width.max(1);
        let height = initial_size.height.max(1);
        if width > max_dimension || height > max_dimension {
            anyhow::bail!(
                "GPU max texture dimension is {max_dimension}, requested surface is {width}x{height}"
            );
        }

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no supported formats")?;

        let format_features = adapter.get_texture_format_features(surface_format);
        let sample_count = negotiate_sample_count(
            antialiasing,
            format_features.flags.supported_sample_counts(),
            format_features
                .flags
                .contains(TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE),
            is_software,
        );

        let mut required_features = wgpu::Features::empty();
        if sample_count > 4 {
            required_features |= wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES;
        }

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("particlewall device"),
            required_features,
            required_limits: limits.clone(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .map_err(CapabilityError::from)?;

        let alpha_mode = select_alpha_mode(surface_alpha, &surface_caps.alpha_modes);
        tracing::debug!(?surface_format, sample_count, ?alpha_mode, "configuring surface");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size: PhysicalSize::new(width, height),
            sample_count,
            surface_format,
            _instance: instance,
        })
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Re-applies the current configuration after the surface was lost.
    pub(crate) fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}

fn negotiate_sample_count(
    antialiasing: Antialiasing,
    mut supported: Vec<u32>,
    supports_resolve: bool,
    is_software: bool,
) -> u32 {
    if !supported.contains(&1) {
        supported.push(1);
    }
    supported.sort_unstable();
    supported.dedup();

    let sample_count = match antialiasing {
        Antialiasing::Auto => supported.last().copied().unwrap_or(1),
        Antialiasing::Off => 1,
        Antialiasing::Samples(requested) if supported.contains(&requested) => requested,
        Antialiasing::Samples(requested) => {
            let fallback = supported
                .iter()
                .copied()
                .filter(|&count| count <= requested)
                .max()
                .unwrap_or(1);
            tracing::warn!(
                requested,
                fallback,
                ?supported,
                "requested MSAA sample count not supported; falling back"
            );
            fallback
        }
    };

    if sample_count > 1 && !supports_resolve {
        tracing::warn!("surface format does not support MSAA resolve; disabling MSAA");
        return 1;
    }
    if sample_count > 1 && is_software {
        tracing::warn!(
            sample_count,
            "software rasterizer detected; disabling MSAA for performance"
        );
        return 1;
    }
    sample_count
}

/// Picks a compositor alpha mode.
///
/// Sprites are blended over a transparent clear with `SrcAlpha`, which leaves
/// premultiplied colour in the target, so that mode is preferred.
fn select_alpha_mode(
    surface_alpha: SurfaceAlpha,
    available: &[wgpu::CompositeAlphaMode],
) -> wgpu::CompositeAlphaMode {
    let preferred: &[wgpu::CompositeAlphaMode] = match surface_alpha {
        SurfaceAlpha::Transparent => &[
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ],
        SurfaceAlpha::Opaque => &[wgpu::CompositeAlphaMode::Opaque],
    };
    let chosen = preferred
        .iter()
        .copied()
        .find(|mode| available.contains(mode))
        .or_else(|| available.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);
    if surface_alpha == SurfaceAlpha::Transparent && !preferred.contains(&chosen) {
        tracing::warn!(
            ?chosen,
            ?available,
            "compositor does not offer a translucent alpha mode; background will be opaque"
        );
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::CompositeAlphaMode;

    #[test]
    fn auto_picks_highest_supported_sample_count() {
        assert_eq!(
            negotiate_sample_count(Antialiasing::Auto, vec![1, 2, 4], true, false),
            4
        );
        assert_eq!(negotiate_sample_count(Antialiasing::Auto, vec![], true, false), 1);
    }

    #[test]
    fn explicit_sample_count_falls_back_downwards() {
        assert_eq!(
            negotiate_sample_count(Antialiasing::Samples(8), vec![1, 4], true, false),
            4
        );
        assert_eq!(
            negotiate_sample_count(Antialiasing::Samples(2), vec![1, 2, 4], true, false),
            2
        );
        assert_eq!(
            negotiate_sample_count(Antialiasing::Off, vec![1, 2, 4], true, false),
            1
        );
    }

    #[test]
    fn msaa_is_disabled_without_resolve_or_on_software() {
        assert_eq!(
            negotiate_sample_count(Antialiasing::Auto, vec![1, 4], false, false),
            1
        );
        assert_eq!(
            negotiate_sample_count(Antialiasing::Auto, vec![1, 4], true, true),
            1
        );
    }

    #[test]
    fn transparent_surfaces_prefer_premultiplied_alpha() {
        let all = [
            CompositeAlphaMode::Opaque,
            CompositeAlphaMode::PostMultiplied,
            CompositeAlphaMode::PreMultiplied,
        ];
        assert_eq!(
            select_alpha_mode(SurfaceAlpha::Transparent, &all),
            CompositeAlphaMode::PreMultiplied
        );
        assert_eq!(
            select_alpha_mode(
                SurfaceAlpha::Transparent,
                &[CompositeAlphaMode::Opaque, CompositeAlphaMode::PostMultiplied]
            ),
            CompositeAlphaMode::PostMultiplied
        );
        assert_eq!(
            select_alpha_mode(SurfaceAlpha::Transparent, &[CompositeAlphaMode::Opaque]),
            CompositeAlphaMode::Opaque
        );
        assert_eq!(
            select_alpha_mode(SurfaceAlpha::Opaque, &all),
            CompositeAlphaMode::Opaque
        );
    }
}
