//! Still and animated Julia set rendering.

use std::path::{Path, PathBuf};

use log::{debug, info};
use num_complex::Complex64;
use rayon::prelude::{IntoParallelIterator, ParallelIterator};

use crate::{
    colour::{ColourMap, Normalisation, DEFAULT_COLOUR_MAP},
    compute::{frame_batches, frames_in_flight},
    encoder::{check_animation_path, still_format, write_still, AnimationEncoder, GifEncoder},
    error::RenderError,
    grid::{sample, EscapeMatrix, ANIMATION_DOMAIN, STILL_DOMAIN},
    orbit::{frame_constant, phase},
};

pub const DEFAULT_FRAMES: u32 = 120;
pub const DEFAULT_INTERVAL_MS: u32 = 40;

/// GIF frame delays are stored in whole centiseconds.
pub const INTERVAL_STEP_MS: u32 = 10;

/// What to sample and how to colour it; shared by stills and animations.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderParams {
    /// Iteration budget per point.
    pub threshold: u32,
    /// Samples per axis.
    pub density: usize,
    pub constant: Complex64,
    pub colour_map: String,
    pub normalisation: Normalisation,
}

impl RenderParams {
    pub fn new(threshold: u32, density: usize, constant: Complex64) -> Self {
        Self {
            threshold,
            density,
            constant,
            colour_map: DEFAULT_COLOUR_MAP.to_string(),
            normalisation: Normalisation::default(),
        }
    }

    pub fn with_colour_map(mut self, colour_map: impl Into<String>) -> Self {
        self.colour_map = colour_map.into();
        self
    }

    pub fn with_normalisation(mut self, normalisation: Normalisation) -> Self {
        self.normalisation = normalisation;
        self
    }

    /// Checks everything that can be checked without touching the filesystem,
    /// and resolves the colour map.
    pub fn validate(&self) -> Result<ColourMap, RenderError> {
        if self.density == 0 {
            return Err(RenderError::invalid("density", "must be at least 1"));
        }
        if u32::try_from(self.density).is_err() {
            return Err(RenderError::invalid(
                "density",
                format!("{} is too large for an image", self.density),
            ));
        }
        if self.threshold == 0 {
            return Err(RenderError::invalid("threshold", "must be at least 1"));
        }
        if !(self.constant.re.is_finite() && self.constant.im.is_finite()) {
            return Err(RenderError::invalid(
                "constant",
                format!("{} is not finite", self.constant),
            ));
        }
        ColourMap::by_name(&self.colour_map)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationParams {
    pub frames: u32,
    /// Display time of each frame. Must be a positive multiple of
    /// [`INTERVAL_STEP_MS`].
    pub interval_ms: u32,
    /// Side length of the encoded frames, reached by bicubic resampling.
    /// `None` encodes the grid pixel-for-pixel, without smoothing.
    pub frame_size: Option<u32>,
    /// Upper bound on frames sampled ahead of the encoder. `None` uses one per CPU.
    pub frames_in_flight: Option<usize>,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            frames: DEFAULT_FRAMES,
            interval_ms: DEFAULT_INTERVAL_MS,
            frame_size: None,
            frames_in_flight: None,
        }
    }
}

impl AnimationParams {
    pub fn validate(&self) -> Result<usize, RenderError> {
        if self.frames == 0 {
            return Err(RenderError::invalid("frames", "must be at least 1"));
        }
        if self.interval_ms == 0 || self.interval_ms % INTERVAL_STEP_MS != 0 {
            return Err(RenderError::invalid(
                "interval",
                format!(
                    "{} ms is not a positive multiple of {INTERVAL_STEP_MS} ms",
                    self.interval_ms
                ),
            ));
        }
        if self.frame_size == Some(0) {
            return Err(RenderError::invalid("frame_size", "must be at least 1"));
        }
        match self.frames_in_flight {
            Some(0) => Err(RenderError::invalid("frames_in_flight", "must be at least 1")),
            Some(in_flight) => Ok(in_flight),
            None => Ok(frames_in_flight()),
        }
    }
}

/// Escape matrix of a still image, without writing anything.
pub fn still_matrix(params: &RenderParams) -> Result<EscapeMatrix, RenderError> {
    params.validate()?;
    Ok(sample(
        STILL_DOMAIN,
        params.density,
        params.constant,
        params.threshold,
    ))
}

/**
Render a still image of the Julia set for `params.constant` over `[-1.5, 1.5]²`
and write it to `output_path`, in the format its extension names.

The output directory must already exist. Returns the (untransposed) escape
matrix that was encoded.
*/
pub fn render_still(
    params: &RenderParams,
    output_path: impl AsRef<Path>,
) -> Result<EscapeMatrix, RenderError> {
    let output_path = output_path.as_ref();
    let map = params.validate()?;
    still_format(output_path)?;

    info!(
        "rendering {}x{} still for c = {} (threshold {})",
        params.density, params.density, params.constant, params.threshold
    );
    let matrix = sample(
        STILL_DOMAIN,
        params.density,
        params.constant,
        params.threshold,
    );
    let path = write_still(&matrix.transposed(), &map, params.normalisation, output_path)?;
    info!("wrote {}", path.display());

    Ok(matrix)
}

/// Escape matrix of animation frame `index`.
pub fn animation_frame(params: &RenderParams, index: u32, frames: u32) -> EscapeMatrix {
    let theta = phase(index, frames);
    let constant = frame_constant(params.constant, theta);
    debug!("frame {index}: theta = {theta:.4}, c = {constant}");
    sample(ANIMATION_DOMAIN, params.density, constant, params.threshold)
}

/**
Run the animation frame loop into `encoder`.

Frames are sampled in batches of at most `frames_in_flight`, in parallel within
a batch, and handed to the encoder transposed and strictly in frame order. The
encoder is finished only if every frame was accepted. Returns the number of
frames pushed.
*/
pub fn render_animation_with<E: AnimationEncoder>(
    params: &RenderParams,
    animation: &AnimationParams,
    mut encoder: E,
) -> Result<u32, RenderError> {
    params.validate()?;
    let in_flight = animation.validate()?;

    info!(
        "rendering {} frames of {}x{} for |c| = {} (threshold {}, {} in flight)",
        animation.frames,
        params.density,
        params.density,
        params.constant.norm(),
        params.threshold,
        in_flight
    );

    let mut pushed = 0;
    for batch in frame_batches(animation.frames, in_flight) {
        debug!("sampling frames {}..{}", batch.start, batch.end);
        let matrices: Vec<EscapeMatrix> = batch
            .into_par_iter()
            .map(|index| animation_frame(params, index, animation.frames).transposed())
            .collect();

        for matrix in &matrices {
            encoder.push_frame(matrix)?;
            pushed += 1;
        }
    }

    encoder.finish()?;
    Ok(pushed)
}

/**
Render an animation of `animation.frames` frames, sweeping the constant once
around the circle of radius `|params.constant|`, and write it as a looping GIF
to `output_path`.

Nothing is left at `output_path` if any frame fails.
*/
pub fn render_animation(
    params: &RenderParams,
    animation: &AnimationParams,
    output_path: impl AsRef<Path>,
) -> Result<PathBuf, RenderError> {
    let output_path = output_path.as_ref();
    let map = params.validate()?;
    animation.validate()?;
    check_animation_path(output_path)?;

    let encoder = GifEncoder::create(
        output_path,
        map,
        params.normalisation,
        animation.interval_ms,
        animation.frame_size,
    )?;
    let frames = render_animation_with(params, animation, encoder)?;
    info!("wrote {} frames to {}", frames, output_path.display());

    Ok(output_path.to_path_buf())
}
