use std::ops::Range;

/// Default number of animation frames sampled concurrently.
///
/// Frames are held in memory until every earlier frame has been handed to the
/// encoder, so this is also the bound on buffered escape matrices.
pub fn frames_in_flight() -> usize {
    num_cpus::get().max(1)
}

/**
Split `0..frames` into consecutive batches of at most `in_flight` frame indices.

The animation loop samples one batch in parallel, submits its frames in index
order, and only then moves on to the next batch. With `in_flight = 4` and
`frames = 10` the batches are `0..4`, `4..8` and `8..10`.

`in_flight` must be at least 1.
*/
pub fn frame_batches(frames: u32, in_flight: usize) -> impl Iterator<Item = Range<u32>> {
    debug_assert!(in_flight >= 1);
    let in_flight = u32::try_from(in_flight).unwrap_or(u32::MAX).max(1);
    (0..frames)
        .step_by(in_flight as usize)
        .map(move |start| start..start.saturating_add(in_flight).min(frames))
}
