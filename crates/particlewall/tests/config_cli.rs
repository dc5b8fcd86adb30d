use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

fn particlewall(config_dir: &std::path::Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_particlewall"))
        .env("PARTICLEWALL_CONFIG_DIR", config_dir)
        .env_remove("PARTICLEWALL_CONFIG")
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run particlewall")
}

#[test]
fn config_show_merges_file_and_overrides() {
    let root = TempDir::new().unwrap();
    let file = root.path().join("custom.toml");
    fs::write(
        &file,
        "particleCount = 40\nparticle_colors = [\"#ff0000\"]\n[window]\nwidth = 800\n",
    )
    .unwrap();

    let output = particlewall(
        root.path(),
        &[
            "--config",
            file.to_str().unwrap(),
            "--count",
            "42",
            "--no-rotation",
            "config",
            "show",
        ],
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("particle_count = 42"), "{stdout}");
    assert!(stdout.contains("disable_rotation = true"), "{stdout}");
    assert!(stdout.contains("#ff0000"), "{stdout}");
    assert!(stdout.contains("width = 800"), "{stdout}");
}

#[test]
fn config_show_without_file_prints_defaults() {
    let root = TempDir::new().unwrap();
    let output = particlewall(root.path(), &["config", "show"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("particle_count = 150"), "{stdout}");
    assert!(stdout.contains("move_particles_on_hover = true"), "{stdout}");
}

#[test]
fn invalid_configuration_is_rejected() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("particlewall.toml"),
        "particle_count = 0\n",
    )
    .unwrap();

    let output = particlewall(root.path(), &["config", "show"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("particle_count must be greater than zero"), "{stderr}");
}

#[test]
fn config_where_reports_override_directory() {
    let root = TempDir::new().unwrap();
    let output = particlewall(root.path(), &["config", "where"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let expected = root.path().join("particlewall.toml");
    assert!(stdout.contains(&expected.display().to_string()), "{stdout}");
    assert!(stdout.contains("missing"), "{stdout}");
}
