//! Sampling grid over the complex plane and the matrix of escape counts it produces.

use log::trace;
use num_complex::Complex64;
use rayon::prelude::{IndexedParallelIterator, ParallelIterator, ParallelSliceMut};

use crate::escape::escape_time;

/// Range sampled along both the real and the imaginary axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    pub start: f64,
    pub end: f64,
}

/// Domain used for still images.
pub const STILL_DOMAIN: Domain = Domain {
    start: -1.5,
    end: 1.5,
};

/// Domain used for every animation frame.
pub const ANIMATION_DOMAIN: Domain = Domain {
    start: -2.0,
    end: 2.0,
};

impl Domain {
    /// `density` evenly spaced samples from `start` to `end`, both inclusive.
    ///
    /// A single sample sits on `start`.
    pub fn axis(&self, density: usize) -> Vec<f64> {
        match density {
            0 => Vec::new(),
            1 => vec![self.start],
            _ => {
                let step = (self.end - self.start) / (density - 1) as f64;
                (0..density)
                    .map(|index| {
                        if index == density - 1 {
                            self.end
                        } else {
                            self.start + index as f64 * step
                        }
                    })
                    .collect()
            }
        }
    }
}

/// Square matrix of escape counts, stored row-major.
///
/// Row `r` holds the samples taken at the `r`th real-axis value, column `c` the
/// `c`th imaginary-axis value. Image encoders want the opposite convention
/// (x along a row), which is what [`EscapeMatrix::transposed`] is for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscapeMatrix {
    density: usize,
    counts: Vec<u32>,
}

impl EscapeMatrix {
    pub fn from_counts(density: usize, counts: Vec<u32>) -> Self {
        assert_eq!(
            counts.len(),
            density * density,
            "expected {density}x{density} counts"
        );
        Self { density, counts }
    }

    pub fn density(&self) -> usize {
        self.density
    }

    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.counts[row * self.density + col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        // `chunks_exact(0)` panics, and an empty matrix has no rows anyway.
        self.counts.chunks_exact(self.density.max(1))
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.counts
    }

    pub fn transposed(&self) -> Self {
        let density = self.density;
        let mut counts = vec![0; self.counts.len()];
        for (row, values) in self.rows().enumerate() {
            for (col, value) in values.iter().enumerate() {
                counts[col * density + row] = *value;
            }
        }
        Self { density, counts }
    }

    /// Smallest and largest count, `None` for an empty matrix.
    pub fn min_max(&self) -> Option<(u32, u32)> {
        let first = *self.counts.first()?;
        Some(
            self.counts
                .iter()
                .fold((first, first), |(min, max), &value| {
                    (min.min(value), max.max(value))
                }),
        )
    }
}

/**
Evaluate [`escape_time`] at every point of a `density × density` grid over
`domain` for the constant `constant`.

This is the one routine behind both still images and animation frames. Rows
are independent and are filled in parallel; the result does not depend on
scheduling.
*/
pub fn sample(domain: Domain, density: usize, constant: Complex64, threshold: u32) -> EscapeMatrix {
    trace!("begin sample");

    let real_axis = domain.axis(density);
    let imaginary_axis = domain.axis(density);
    let mut counts = vec![0u32; density * density];

    if density > 0 {
        counts
            .par_chunks_exact_mut(density)
            .enumerate()
            .for_each(|(row, cells)| {
                let re = real_axis[row];
                for (cell, im) in cells.iter_mut().zip(&imaginary_axis) {
                    *cell = escape_time(Complex64::new(re, *im), constant, threshold);
                }
            });
    }

    trace!("end sample");

    EscapeMatrix { density, counts }
}
