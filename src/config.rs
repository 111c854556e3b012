use anyhow::{Context, Result};
use num_complex::Complex64;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{
    colour::{Normalisation, DEFAULT_COLOUR_MAP},
    render::{AnimationParams, RenderParams, DEFAULT_FRAMES, DEFAULT_INTERVAL_MS},
};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "julia.toml";

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Constant {
    pub re: f64,
    pub im: f64,
}

impl From<Constant> for Complex64 {
    fn from(constant: Constant) -> Self {
        Complex64::new(constant.re, constant.im)
    }
}

/// Settings file. Every key is optional; missing keys take the defaults below.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Still images land here. Must exist.
    pub images_dir: PathBuf,
    /// Animations land here. Must exist.
    pub animations_dir: PathBuf,
    pub threshold: u32,
    pub density: usize,
    pub colour_map: String,
    pub normalisation: Normalisation,
    pub constant: Constant,
    pub frames: u32,
    pub interval_ms: u32,
    pub frame_size: Option<u32>,
    pub frames_in_flight: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("images"),
            animations_dir: PathBuf::from("animations"),
            threshold: 100,
            density: 500,
            colour_map: DEFAULT_COLOUR_MAP.to_string(),
            normalisation: Normalisation::MinMax,
            constant: Constant {
                re: -0.8,
                im: 0.156,
            },
            frames: DEFAULT_FRAMES,
            interval_ms: DEFAULT_INTERVAL_MS,
            frame_size: None,
            frames_in_flight: None,
        }
    }
}

impl Config {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Parse config")
    }

    pub fn render_params(&self) -> RenderParams {
        RenderParams::new(self.threshold, self.density, self.constant.into())
            .with_colour_map(self.colour_map.clone())
            .with_normalisation(self.normalisation)
    }

    pub fn animation_params(&self) -> AnimationParams {
        AnimationParams {
            frames: self.frames,
            interval_ms: self.interval_ms,
            frame_size: self.frame_size,
            frames_in_flight: self.frames_in_flight,
        }
    }
}

pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }
    let fallback = Path::new(DEFAULT_CONFIG_FILE);
    fallback.is_file().then(|| fallback.to_path_buf())
}

pub fn load(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Read config {}", path.display()))?;
    Config::parse(&text).with_context(|| format!("Load config {}", path.display()))
}

/// The explicit file if given (it must exist), else `julia.toml` if present, else defaults.
pub fn load_or_default(cli_path: Option<&Path>) -> Result<Config> {
    match resolve_config_path(cli_path) {
        Some(path) => {
            log::debug!("loading config from {}", path.display());
            load(&path)
        }
        None => Ok(Config::default()),
    }
}
