//! Julia set rendering: escape-time sampling of `z ← z² + c` over a square grid,
//! written out as colour-mapped still images or looping GIF animations.

pub mod canvas;
pub mod cli;
pub mod colour;
pub mod compute;
pub mod config;
pub mod encoder;
pub mod error;
pub mod escape;
pub mod grid;
pub mod orbit;
pub mod pixel;
pub mod render;

pub use encoder::AnimationEncoder;
pub use error::RenderError;
pub use escape::escape_time;
pub use grid::{EscapeMatrix, ANIMATION_DOMAIN, STILL_DOMAIN};
pub use render::{
    render_animation, render_animation_with, render_still, still_matrix, AnimationParams,
    RenderParams,
};
