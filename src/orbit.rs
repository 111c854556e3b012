//! The per-frame constant of an animation.
//!
//! The constant keeps the magnitude of the base constant and is swept once
//! around the circle over the course of the animation. This is a visual
//! effect only; `c · e^{iθ}` looks similar but gives different frames.

use std::f64::consts::TAU;

use num_complex::Complex64;

/// Phase angle of frame `index` out of `frames`, in `[0, 2π)`.
pub fn phase(index: u32, frames: u32) -> f64 {
    TAU * index as f64 / frames as f64
}

/// `|c| · (cos θ + i sin θ)`.
pub fn frame_constant(base: Complex64, theta: f64) -> Complex64 {
    let magnitude = base.norm();
    Complex64::new(magnitude * theta.cos(), magnitude * theta.sin())
}
