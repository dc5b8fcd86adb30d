mod cli;
mod paths;
mod run;
mod settings;

use anyhow::Result;
use cli::{Command, ConfigAction, RunArgs};
use paths::AppPaths;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Config(config_cmd)) => handle_config_command(config_cmd.action, &cli.run),
        None => run::run(cli.run),
    }
}

fn handle_config_command(action: ConfigAction, args: &RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    match action {
        ConfigAction::Show => run_config_show(&paths, args),
        ConfigAction::Where => run_config_where(&paths, args),
    }
}

fn run_config_show(paths: &AppPaths, args: &RunArgs) -> Result<()> {
    let resolved = settings::resolve_config(args, paths)?;
    if !resolved.from_file {
        eprintln!(
            "# no configuration file at {}; showing defaults",
            resolved.path.display()
        );
    }
    print!("{}", resolved.document.to_toml_string()?);
    Ok(())
}

fn run_config_where(paths: &AppPaths, args: &RunArgs) -> Result<()> {
    let path = settings::config_path(args, paths);
    println!("Configuration:");
    println!("  directory:  {}", paths.config_dir().display());
    println!("  file:       {}", path.display());
    println!(
        "  status:     {}",
        if path.exists() { "present" } else { "missing" }
    );
    Ok(())
}
