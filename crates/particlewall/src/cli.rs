use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fieldconfig::{parse_antialias, AntialiasSetting};

#[derive(Parser, Debug)]
#[command(
    name = "particlewall",
    author,
    version,
    about = "Decorative GPU particle field",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Launch options. Everything except `--config` overrides a key of the
/// configuration file.
#[derive(Parser, Debug, Clone, Default)]
pub struct RunArgs {
    /// Configuration file to load instead of the default location.
    #[arg(long, value_name = "FILE", env = "PARTICLEWALL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of particles generated at start-up.
    #[arg(long, value_name = "N")]
    pub count: Option<u32>,

    /// Edge length of the cube particles are scattered in.
    #[arg(long, value_name = "UNITS")]
    pub spread: Option<f32>,

    /// Animation time multiplier.
    #[arg(long, value_name = "FACTOR", allow_hyphen_values = true)]
    pub speed: Option<f32>,

    /// Comma-separated `#RRGGBB` palette (malformed entries render white).
    #[arg(long, value_name = "HEX,...", value_delimiter = ',')]
    pub colors: Option<Vec<String>>,

    /// Ignore the pointer and let input pass through the window.
    #[arg(long)]
    pub no_hover: bool,

    /// Strength of the pull towards the pointer.
    #[arg(long, value_name = "FACTOR", allow_hyphen_values = true)]
    pub hover_factor: Option<f32>,

    /// Draw flat discs instead of fading sprites towards their rim.
    #[arg(long)]
    pub no_alpha: bool,

    /// Point size in pixels at unit depth.
    #[arg(long, value_name = "PIXELS")]
    pub base_size: Option<f32>,

    /// Per-particle size jitter in `[0, 1]`.
    #[arg(long, value_name = "AMOUNT")]
    pub size_randomness: Option<f32>,

    /// Distance of the camera from the origin.
    #[arg(long, value_name = "UNITS")]
    pub camera_distance: Option<f32>,

    /// Disable the slow tumble of the whole field.
    #[arg(long)]
    pub no_rotation: bool,

    /// Seed particle generation for a reproducible layout.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Override the window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<AntialiasSetting>,

    /// Render a single still frame at this timestamp instead of animating.
    #[arg(long, value_name = "SECONDS")]
    pub still_time: Option<f32>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect the resolved configuration.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration (file plus command-line overrides) as TOML.
    Show,
    /// Print where the configuration file is looked up.
    Where,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1920x1080".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in size '{trimmed}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in size '{trimmed}'"))?;

    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".to_string());
    }

    Ok((width, height))
}
