//! Escape-time evaluation for `z ← z² + c`.

use num_complex::Complex64;

/// An orbit is considered divergent once `|z|` exceeds this modulus.
pub const DIVERGENCE_RADIUS: f64 = 4.0;

/**
Number of iterations of `z ← z² + c`, starting at `z0`, that run before `|z|`
exceeds [`DIVERGENCE_RADIUS`].

The result is the 0-based index of the iteration that stopped the loop:
either the one where the orbit escaped, or the last one of the `threshold`
budget (`threshold - 1`) when it never did. So for any `threshold >= 1` the
result lies in `[0, threshold - 1]`.

A `threshold` of 0 runs no iterations and returns 0.

A NaN modulus never compares greater than the radius, so an orbit that turns
into NaN runs out the budget. An infinite one escapes.
*/
#[inline]
pub fn escape_time(z0: Complex64, c: Complex64, threshold: u32) -> u32 {
    if threshold == 0 {
        return 0;
    }

    let mut z = z0;
    for iteration in 0..threshold {
        z = z * z + c;
        if z.norm() > DIVERGENCE_RADIUS {
            return iteration;
        }
    }
    threshold - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_threshold_is_zero() {
        assert_eq!(escape_time(Complex64::new(0.3, 0.1), Complex64::new(-0.8, 0.156), 0), 0);
    }

    #[test]
    fn origin_with_zero_constant_never_escapes() {
        for threshold in [1, 2, 10, 255, 1000] {
            assert_eq!(
                escape_time(Complex64::new(0.0, 0.0), Complex64::new(0.0, 0.0), threshold),
                threshold - 1
            );
        }
    }

    #[test]
    fn period_two_cycle_runs_out_the_budget() {
        // 0 -> -1 -> 0 -> -1 ...
        assert_eq!(escape_time(Complex64::new(0.0, 0.0), Complex64::new(-1.0, 0.0), 10), 9);
    }

    #[test]
    fn far_points_escape_on_the_first_iteration() {
        let c = Complex64::new(0.0, 0.0);
        for z0 in [
            Complex64::new(2.01, 0.0),
            Complex64::new(0.0, -2.5),
            Complex64::new(1.5, 1.5),
            Complex64::new(-100.0, 3.0),
        ] {
            assert_eq!(escape_time(z0, c, 50), 0, "z0 = {z0}");
        }
    }

    #[test]
    fn radius_two_is_not_yet_divergent() {
        // |2²| == 4 is not > 4, the next square is.
        assert_eq!(escape_time(Complex64::new(2.0, 0.0), Complex64::new(0.0, 0.0), 50), 1);
    }

    #[test]
    fn result_stays_below_threshold() {
        let c = Complex64::new(-0.8, 0.156);
        for threshold in 1..40 {
            for step in 0..30 {
                let t = step as f64 / 30.0;
                let z0 = Complex64::new(-1.5 + 3.0 * t, 1.5 - 3.0 * t * t);
                assert!(escape_time(z0, c, threshold) < threshold);
            }
        }
    }

    #[test]
    fn infinite_start_escapes_immediately() {
        let z0 = Complex64::new(f64::INFINITY, 0.0);
        assert_eq!(escape_time(z0, Complex64::new(0.0, 0.0), 20), 0);
    }

    #[test]
    fn nan_orbit_runs_out_the_budget() {
        let z0 = Complex64::new(f64::NAN, 0.0);
        assert_eq!(escape_time(z0, Complex64::new(0.0, 0.0), 20), 19);
    }
}
