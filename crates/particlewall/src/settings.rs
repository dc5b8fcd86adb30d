use std::path::PathBuf;

use anyhow::{Context, Result};
use fieldconfig::{AntialiasSetting, FieldConfig};
use particles::{Antialiasing, ParticleOptions, RenderPolicy, RendererConfig, SurfaceAlpha};

use crate::cli::RunArgs;
use crate::paths::AppPaths;

/// Configuration document after file discovery and command-line overrides.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub path: PathBuf,
    /// False when the default location had no file and defaults were used.
    pub from_file: bool,
    pub document: FieldConfig,
}

pub fn config_path(args: &RunArgs, paths: &AppPaths) -> PathBuf {
    args.config
        .clone()
        .unwrap_or_else(|| paths.config_file())
}

/// Loads the configuration and merges overrides on top.
///
/// An explicitly named file must exist; the default location may be empty.
pub fn resolve_config(args: &RunArgs, paths: &AppPaths) -> Result<ResolvedConfig> {
    let path = config_path(args, paths);
    let from_file = args.config.is_some() || path.exists();
    let mut document = if args.config.is_some() {
        FieldConfig::load(&path)
    } else {
        FieldConfig::load_or_default(&path)
    }
    .with_context(|| format!("failed to load configuration from {}", path.display()))?;

    apply_overrides(&mut document, args);
    document
        .validate()
        .context("command-line overrides produced an invalid configuration")?;

    tracing::debug!(
        path = %path.display(),
        from_file,
        count = document.particle_count,
        "resolved particle configuration"
    );

    Ok(ResolvedConfig {
        path,
        from_file,
        document,
    })
}

pub fn apply_overrides(document: &mut FieldConfig, args: &RunArgs) {
    if let Some(count) = args.count {
        document.particle_count = count;
    }
    if let Some(spread) = args.spread {
        document.particle_spread = spread;
    }
    if let Some(speed) = args.speed {
        document.speed = speed;
    }
    if let Some(colors) = args.colors.as_ref() {
        document.particle_colors = Some(colors.clone());
    }
    if args.no_hover {
        document.move_particles_on_hover = false;
    }
    if let Some(factor) = args.hover_factor {
        document.particle_hover_factor = factor;
    }
    if args.no_alpha {
        document.alpha_particles = false;
    }
    if let Some(size) = args.base_size {
        document.particle_base_size = size;
    }
    if let Some(randomness) = args.size_randomness {
        document.size_randomness = randomness;
    }
    if let Some(distance) = args.camera_distance {
        document.camera_distance = distance;
    }
    if args.no_rotation {
        document.disable_rotation = true;
    }
    if let Some(seed) = args.seed {
        document.seed = Some(seed);
    }
    if let Some((width, height)) = args.size {
        document.window.width = width;
        document.window.height = height;
    }
    if let Some(antialias) = args.antialias {
        document.antialias = Some(antialias);
    }
}

pub fn renderer_config(document: &FieldConfig, args: &RunArgs) -> RendererConfig {
    let options = ParticleOptions {
        particle_count: document.particle_count,
        particle_spread: document.particle_spread,
        speed: document.speed,
        particle_colors: document.particle_colors.clone(),
        move_particles_on_hover: document.move_particles_on_hover,
        particle_hover_factor: document.particle_hover_factor,
        alpha_particles: document.alpha_particles,
        particle_base_size: document.particle_base_size,
        size_randomness: document.size_randomness,
        camera_distance: document.camera_distance,
        disable_rotation: document.disable_rotation,
        seed: document.seed,
    };

    let policy = match args.still_time {
        Some(time) => RenderPolicy::Still { time },
        None => RenderPolicy::Animate,
    };

    RendererConfig {
        surface_size: (document.window.width, document.window.height),
        title: document.window.title.clone(),
        options,
        antialiasing: map_antialias(document.antialias),
        surface_alpha: if document.transparent {
            SurfaceAlpha::Transparent
        } else {
            SurfaceAlpha::Opaque
        },
        policy,
    }
}

pub fn map_antialias(setting: Option<AntialiasSetting>) -> Antialiasing {
    match setting {
        None | Some(AntialiasSetting::Auto) => Antialiasing::Auto,
        Some(AntialiasSetting::Off) => Antialiasing::Off,
        Some(other) => other
            .samples()
            .map(Antialiasing::Samples)
            .unwrap_or(Antialiasing::Auto),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use tempfile::TempDir;

    #[test]
    fn overrides_replace_document_values() {
        let mut document = FieldConfig::default();
        let args = RunArgs {
            count: Some(12),
            colors: Some(vec!["#123456".to_string()]),
            no_hover: true,
            no_alpha: true,
            no_rotation: true,
            seed: Some(7),
            size: Some((640, 480)),
            antialias: Some(AntialiasSetting::Samples8),
            ..RunArgs::default()
        };
        apply_overrides(&mut document, &args);

        assert_eq!(document.particle_count, 12);
        assert_eq!(document.particle_colors, Some(vec!["#123456".to_string()]));
        assert!(!document.move_particles_on_hover);
        assert!(!document.alpha_particles);
        assert!(document.disable_rotation);
        assert_eq!(document.seed, Some(7));
        assert_eq!((document.window.width, document.window.height), (640, 480));
        assert_eq!(document.antialias, Some(AntialiasSetting::Samples8));
        assert_eq!(document.particle_spread, 15.0);
    }

    #[test]
    fn absent_flags_leave_document_untouched() {
        let mut document = FieldConfig::default();
        document.move_particles_on_hover = false;
        apply_overrides(&mut document, &RunArgs::default());
        let mut expected = FieldConfig::default();
        expected.move_particles_on_hover = false;
        assert_eq!(document, expected);
    }

    #[test]
    fn maps_document_onto_renderer_config() {
        let mut document = FieldConfig::default();
        document.transparent = false;
        document.camera_distance = 22.0;
        let config = renderer_config(&document, &RunArgs::default());

        assert_eq!(config.options.camera_distance, 22.0);
        assert_eq!(config.options.particle_count, 150);
        assert_eq!(config.surface_alpha, SurfaceAlpha::Opaque);
        assert_eq!(config.policy, RenderPolicy::Animate);
        assert_eq!(config.antialiasing, Antialiasing::Auto);
        assert_eq!(config.surface_size, (1920, 1080));

        let still = RunArgs {
            still_time: Some(3.0),
            ..RunArgs::default()
        };
        assert_eq!(
            renderer_config(&document, &still).policy,
            RenderPolicy::Still { time: 3.0 }
        );
    }

    #[test]
    fn maps_antialias_settings() {
        assert_eq!(map_antialias(None), Antialiasing::Auto);
        assert_eq!(map_antialias(Some(AntialiasSetting::Off)), Antialiasing::Off);
        assert_eq!(
            map_antialias(Some(AntialiasSetting::Samples4)),
            Antialiasing::Samples(4)
        );
    }

    #[test]
    fn missing_default_file_resolves_to_defaults() {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::from_raw(dir.path().to_path_buf());
        let resolved = resolve_config(&RunArgs::default(), &paths).unwrap();
        assert!(!resolved.from_file);
        assert_eq!(resolved.path, dir.path().join("particlewall.toml"));
        assert_eq!(resolved.document, FieldConfig::default());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::from_raw(dir.path().to_path_buf());
        let args = RunArgs {
            config: Some(dir.path().join("absent.toml")),
            ..RunArgs::default()
        };
        assert!(resolve_config(&args, &paths).is_err());
    }

    #[test]
    fn overrides_are_revalidated() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("particlewall.toml");
        fs::write(&file, "particle_count = 20\n").unwrap();
        let paths = AppPaths::from_raw(dir.path().to_path_buf());

        let resolved = resolve_config(&RunArgs::default(), &paths).unwrap();
        assert!(resolved.from_file);
        assert_eq!(resolved.document.particle_count, 20);

        let args = RunArgs {
            size_randomness: Some(2.0),
            ..RunArgs::default()
        };
        assert!(resolve_config(&args, &paths).is_err());
    }
}
