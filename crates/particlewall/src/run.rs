use anyhow::Result;
use particles::{ConfigReloader, Renderer};
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::paths::AppPaths;
use crate::settings::{renderer_config, resolve_config};

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let resolved = resolve_config(&args, &paths)?;
    tracing::info!(
        config = %resolved.path.display(),
        from_file = resolved.from_file,
        "starting particlewall"
    );
    let config = renderer_config(&resolved.document, &args);

    let reloader: ConfigReloader = Box::new(move || {
        let resolved = resolve_config(&args, &paths)?;
        tracing::info!(config = %resolved.path.display(), "reloading configuration");
        Ok(renderer_config(&resolved.document, &args))
    });

    Renderer::new(config).with_reloader(reloader).run()
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
