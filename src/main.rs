use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use roomview::{load_scene, RoomViewApp, ViewerConfig};

/// Config file picked up from the working directory when `--config` is not given
const DEFAULT_CONFIG_FILE: &str = "roomview.toml";

#[derive(Debug, Parser)]
#[command(name = "roomview", version, about = "Interactive 3D room viewer and editor")]
struct Cli {
    /// JSON scene description; the built-in room is shown when omitted
    scene: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the OBJ models
    #[arg(short, long, value_name = "DIR")]
    models: Option<PathBuf>,

    /// Directory holding the model textures
    #[arg(short, long, value_name = "DIR")]
    textures: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<ViewerConfig> {
    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => ViewerConfig::load(DEFAULT_CONFIG_FILE)
            .with_context(|| format!("Failed to load config {DEFAULT_CONFIG_FILE}"))?,
        None => ViewerConfig::default(),
    };

    if let Some(scene) = &cli.scene {
        config.paths.scene = Some(scene.clone());
    }
    if let Some(models) = &cli.models {
        config.paths.model_dir = models.clone();
    }
    if let Some(textures) = &cli.textures {
        config.paths.texture_dir = textures.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    log::info!("Starting Room Viewer");
    let (scene, meshes) = load_scene(&config.paths).context("Failed to load scene")?;

    RoomViewApp::new(config, scene, meshes)?.run()
}
