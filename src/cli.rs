use clap::{Args, Parser, Subcommand};
use num_complex::Complex64;
use std::path::{Path, PathBuf};

use crate::{
    colour::Normalisation,
    config::Config,
    render::{AnimationParams, RenderParams},
};

pub const DEFAULT_STILL_FILE: &str = "julia_set.png";
pub const DEFAULT_ANIMATION_FILE: &str = "julia_set.gif";

#[derive(Debug, Parser)]
#[command(
    name = "julia-render",
    about = "Render Julia set fractals as images and looping animations",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Path to a TOML config; default: ./julia.toml if present
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render one image over [-1.5, 1.5]²
    Still {
        #[command(flatten)]
        render: RenderArgs,

        /// File name inside the images directory, or a path containing a directory
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Render a looping GIF over [-2, 2]² with the constant swept around a circle
    Animate {
        #[command(flatten)]
        render: RenderArgs,

        /// Number of frames
        #[arg(long)]
        frames: Option<u32>,

        /// Milliseconds each frame is shown; a multiple of 10 (GIF centiseconds)
        #[arg(long, value_name = "MS")]
        interval: Option<u32>,

        /// Side length of the encoded frames. Bicubic smoothing only applies
        /// when this is given and differs from the density; otherwise frames
        /// are encoded pixel-for-pixel
        #[arg(long, value_name = "PIXELS")]
        frame_size: Option<u32>,

        /// Frames sampled ahead of the encoder; default: one per CPU
        #[arg(long, value_name = "N")]
        in_flight: Option<usize>,

        /// File name inside the animations directory, or a path containing a directory
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Iteration budget per point
    #[arg(short, long)]
    pub threshold: Option<u32>,

    /// Samples per axis
    #[arg(short, long)]
    pub density: Option<usize>,

    /// Real part of the constant c
    #[arg(long, allow_hyphen_values = true)]
    pub re: Option<f64>,

    /// Imaginary part of the constant c
    #[arg(long, allow_hyphen_values = true)]
    pub im: Option<f64>,

    /// Colour map name (RdPu, viridis, magma, ...; append _r to reverse)
    #[arg(short, long = "colour-map", alias = "color-map", value_name = "NAME")]
    pub colour_map: Option<String>,

    /// Histogram-equalised colouring instead of min/max
    #[arg(long)]
    pub histogram: bool,
}

impl RenderArgs {
    /// Config values with any flags given on the command line laid on top.
    pub fn merge(&self, config: &Config) -> RenderParams {
        let base = config.render_params();
        let normalisation = if self.histogram {
            Normalisation::Histogram
        } else {
            base.normalisation
        };
        RenderParams {
            threshold: self.threshold.unwrap_or(base.threshold),
            density: self.density.unwrap_or(base.density),
            constant: Complex64::new(
                self.re.unwrap_or(base.constant.re),
                self.im.unwrap_or(base.constant.im),
            ),
            colour_map: self.colour_map.clone().unwrap_or(base.colour_map),
            normalisation,
        }
    }
}

pub fn merge_animation(
    config: &Config,
    frames: Option<u32>,
    interval: Option<u32>,
    frame_size: Option<u32>,
    in_flight: Option<usize>,
) -> AnimationParams {
    let base = config.animation_params();
    AnimationParams {
        frames: frames.unwrap_or(base.frames),
        interval_ms: interval.unwrap_or(base.interval_ms),
        frame_size: frame_size.or(base.frame_size),
        frames_in_flight: in_flight.or(base.frames_in_flight),
    }
}

/// A bare file name goes into `dir`; anything with a directory component is used as given.
pub fn output_path(dir: &Path, output: Option<&PathBuf>, default_file: &str) -> PathBuf {
    match output {
        Some(path) if path.components().count() > 1 || path.is_absolute() => path.clone(),
        Some(file) => dir.join(file),
        None => dir.join(default_file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_constant_parses() {
        let cli = Cli::parse_from([
            "julia-render",
            "still",
            "--re",
            "-0.8",
            "--im",
            "-0.156",
            "-d",
            "32",
        ]);
        let Command::Still { render, .. } = cli.command else {
            panic!("expected still");
        };
        let params = render.merge(&Config::default());
        assert_eq!(params.constant, Complex64::new(-0.8, -0.156));
        assert_eq!(params.density, 32);
        assert_eq!(params.threshold, 100);
        assert_eq!(params.normalisation, Normalisation::MinMax);
    }

    #[test]
    fn animate_flags_override_config() {
        let cli = Cli::parse_from([
            "julia-render",
            "animate",
            "--frames",
            "8",
            "--interval",
            "100",
            "--histogram",
            "--colour-map",
            "inferno",
        ]);
        let Command::Animate {
            render,
            frames,
            interval,
            frame_size,
            in_flight,
            ..
        } = cli.command
        else {
            panic!("expected animate");
        };
        let config = Config {
            frame_size: Some(300),
            ..Config::default()
        };
        let params = render.merge(&config);
        assert_eq!(params.colour_map, "inferno");
        assert_eq!(params.normalisation, Normalisation::Histogram);

        let animation = merge_animation(&config, frames, interval, frame_size, in_flight);
        assert_eq!(animation.frames, 8);
        assert_eq!(animation.interval_ms, 100);
        assert_eq!(animation.frame_size, Some(300));
        assert_eq!(animation.frames_in_flight, None);
    }

    #[test]
    fn bare_names_go_into_the_output_directory() {
        let dir = Path::new("images");
        assert_eq!(
            output_path(dir, None, DEFAULT_STILL_FILE),
            PathBuf::from("images/julia_set.png")
        );
        assert_eq!(
            output_path(dir, Some(&PathBuf::from("c.png")), DEFAULT_STILL_FILE),
            PathBuf::from("images/c.png")
        );
        assert_eq!(
            output_path(dir, Some(&PathBuf::from("elsewhere/c.png")), DEFAULT_STILL_FILE),
            PathBuf::from("elsewhere/c.png")
        );
    }
}
