//! Colouring algorithms.

use fnv::{FnvHashMap, FnvHashSet};
use log::trace;
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use serde::Deserialize;

use crate::{error::RenderError, grid::EscapeMatrix, pixel::Rgb};

/// Name of the colour map used when none is configured.
pub const DEFAULT_COLOUR_MAP: &str = "RdPu";

const RD_PU: &[u32] = &[
    0xfff7f3, 0xfde0dd, 0xfcc5c0, 0xfa9fb5, 0xf768a1, 0xdd3497, 0xae017e, 0x7a0177, 0x49006a,
];
const VIRIDIS: &[u32] = &[
    0x440154, 0x482878, 0x3e4989, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6ece58, 0xb5de2b,
    0xfde725,
];
const MAGMA: &[u32] = &[
    0x000004, 0x180f3d, 0x440f76, 0x721f81, 0x9e2f7f, 0xcd4071, 0xf1605d, 0xfd9668, 0xfeca8d,
    0xfcfdbf,
];
const INFERNO: &[u32] = &[
    0x000004, 0x1b0c41, 0x4a0c6b, 0x781c6d, 0xa52c60, 0xcf4446, 0xed6925, 0xfb9b06, 0xf7d13d,
    0xfcffa4,
];
const PLASMA: &[u32] = &[
    0x0d0887, 0x46039f, 0x7201a8, 0x9c179e, 0xbd3786, 0xd8576b, 0xed7953, 0xfb9f3a, 0xfdca26,
    0xf0f921,
];
const GREYS: &[u32] = &[
    0xffffff, 0xf0f0f0, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x737373, 0x525252, 0x252525, 0x000000,
];
const GRAY: &[u32] = &[0x000000, 0xffffff];
const HOT: &[u32] = &[0x0b0000, 0xff0000, 0xffff00, 0xffffff];

fn builtin_maps() -> FnvHashMap<&'static str, &'static [u32]> {
    let mut maps: FnvHashMap<&'static str, &'static [u32]> = FnvHashMap::default();
    maps.insert("rdpu", RD_PU);
    maps.insert("viridis", VIRIDIS);
    maps.insert("magma", MAGMA);
    maps.insert("inferno", INFERNO);
    maps.insert("plasma", PLASMA);
    maps.insert("greys", GREYS);
    maps.insert("gray", GRAY);
    maps.insert("grey", GRAY);
    maps.insert("hot", HOT);
    maps
}

/// Names accepted by [`ColourMap::by_name`], without the `_r` variants.
pub fn colour_map_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = builtin_maps().into_keys().collect();
    names.sort_unstable();
    names
}

/// A palette of evenly spaced colour stops, sampled with linear interpolation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColourMap {
    stops: Vec<Rgb>,
}

impl ColourMap {
    /// Look up a built-in map. Case-insensitive; a `_r` suffix reverses the map.
    pub fn by_name(name: &str) -> Result<Self, RenderError> {
        let lowered = name.trim().to_ascii_lowercase();
        let (base, reversed) = match lowered.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (lowered.as_str(), false),
        };

        let stops = builtin_maps()
            .get(base)
            .copied()
            .ok_or_else(|| {
                RenderError::invalid(
                    "colour_map",
                    format!(
                        "unknown colour map {name:?}, expected one of {}",
                        colour_map_names().join(", ")
                    ),
                )
            })?;

        let mut stops: Vec<Rgb> = stops.iter().copied().map(Rgb::hex).collect();
        if reversed {
            stops.reverse();
        }
        Ok(Self { stops })
    }

    pub fn from_stops(stops: Vec<Rgb>) -> Self {
        assert!(!stops.is_empty(), "a colour map needs at least one stop");
        Self { stops }
    }

    /// Colour at `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f32) -> Rgb {
        let last = self.stops.len() - 1;
        if last == 0 {
            return self.stops[0];
        }
        let position = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) } * last as f32;
        let index = (position.floor() as usize).min(last - 1);
        self.stops[index].lerp(self.stops[index + 1], position - index as f32)
    }
}

/// How escape counts are mapped onto `[0, 1]` before colouring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Normalisation {
    /// Linear over the matrix's own minimum and maximum.
    #[default]
    MinMax,
    /// Histogram equalisation ([Wikipedia](https://en.wikipedia.org/wiki/Plotting_algorithms_for_the_Mandelbrot_set#Histogram_coloring)).
    Histogram,
}

/// Histogram-based colouring: each count maps to the fraction of cells with a lower count.
pub struct HistogramColouring {
    bucket_labels: Vec<u32>,
    histogram: FnvHashMap<u32, u32>,
    histogram_ranges: FnvHashMap<u32, f32>,
}

impl HistogramColouring {
    pub fn new(matrix: &EscapeMatrix) -> Self {
        let mut bucket_labels: Vec<u32> = Vec::new();
        let mut histogram: FnvHashMap<u32, u32> = FnvHashMap::default();

        for count in matrix.as_slice() {
            let value = histogram.entry(*count).or_insert_with(|| {
                bucket_labels.push(*count);
                0
            });
            *value += 1;
        }

        let total_samples = matrix.as_slice().len();
        debug_assert_eq!(
            total_samples,
            histogram.values().map(|value| *value as usize).sum()
        );
        debug_assert!(
            bucket_labels.len() == bucket_labels.iter().copied().collect::<FnvHashSet<u32>>().len(),
            "bucket_labels contains duplicates: {:?}",
            bucket_labels
        );
        bucket_labels.sort_unstable();

        // The top bucket starts below 1, so stretch the ranges to reach it.
        let top = total_samples
            - bucket_labels
                .last()
                .map(|label| histogram[label] as usize)
                .unwrap_or(0);
        let mut histogram_ranges: FnvHashMap<u32, f32> = FnvHashMap::default();
        let mut acc = 0usize;
        for bucket_label in &bucket_labels {
            let range = if top == 0 {
                0.0
            } else {
                acc as f32 / top as f32
            };
            histogram_ranges.insert(*bucket_label, range);
            acc += histogram[bucket_label] as usize;
        }

        Self {
            bucket_labels,
            histogram,
            histogram_ranges,
        }
    }

    #[cfg(test)]
    fn total_samples(&self) -> usize {
        self.histogram.values().map(|value| *value as usize).sum()
    }

    /// Number of cells holding exactly `count`.
    #[cfg(test)]
    fn frequency(&self, count: u32) -> u32 {
        self.histogram.get(&count).copied().unwrap_or(0)
    }

    /// Distinct counts, ascending.
    #[cfg(test)]
    fn buckets(&self) -> &[u32] {
        &self.bucket_labels
    }

    pub fn value(&self, count: u32) -> f32 {
        self.histogram_ranges.get(&count).copied().unwrap_or(0.0)
    }
}

/// Normalise every count of `matrix` into `[0, 1]`, in matrix order.
pub fn normalise(matrix: &EscapeMatrix, normalisation: Normalisation) -> Vec<f32> {
    match normalisation {
        Normalisation::MinMax => {
            let Some((min, max)) = matrix.min_max() else {
                return Vec::new();
            };
            let span = (max - min) as f32;
            matrix
                .as_slice()
                .par_iter()
                .map(|count| {
                    if span == 0.0 {
                        0.0
                    } else {
                        (count - min) as f32 / span
                    }
                })
                .collect()
        }
        Normalisation::Histogram => {
            let histogram = HistogramColouring::new(matrix);
            matrix
                .as_slice()
                .par_iter()
                .map(|count| histogram.value(*count))
                .collect()
        }
    }
}

/// Colour every cell of `matrix`, in matrix order.
pub fn colourize(matrix: &EscapeMatrix, map: &ColourMap, normalisation: Normalisation) -> Vec<Rgb> {
    trace!("begin colourize");

    let pixels: Vec<Rgb> = normalise(matrix, normalisation)
        .par_iter()
        .map(|t| map.sample(*t))
        .collect();

    trace!("end colourize");
    pixels
}
