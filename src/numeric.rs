// src/numeric.rs - Tolerance policy, monotone binary search, root selection

use roots::Roots;

/// Relative tolerance used for every floating-point comparison in the
/// planner: limit checks, feasibility decisions, boundary snapping, and
/// binary-search convergence.
///
/// Two values are approximately equal when
/// `|a - b| <= EPSILON * max(1.0, |a|, |b|)`, i.e. relative to the larger
/// compared magnitude with an absolute floor of `EPSILON` near zero.
pub const EPSILON: f64 = 1e-9;

/// Iteration cap for [`binary_search`]. The bracket halves every step, so
/// this is far more resolution than f64 can represent.
pub const BINARY_SEARCH_DEPTH: usize = 128;

/// `a == b` under the crate tolerance policy.
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * 1.0_f64.max(a.abs()).max(b.abs())
}

/// `a == 0` under the crate tolerance policy.
pub fn approx_zero(a: f64) -> bool {
    a.abs() <= EPSILON
}

/// `a <= b` allowing tolerance-sized overshoot.
pub fn approx_le(a: f64, b: f64) -> bool {
    a <= b || approx_eq(a, b)
}

/// `a >= b` allowing tolerance-sized undershoot.
pub fn approx_ge(a: f64, b: f64) -> bool {
    a >= b || approx_eq(a, b)
}

/// Clamp a value into `[lo, hi]` when it is within tolerance of either
/// bound; values further out are returned unchanged for the caller to
/// reject.
pub fn snap_to_range(value: f64, lo: f64, hi: f64) -> f64 {
    if value < lo && approx_eq(value, lo) {
        lo
    } else if value > hi && approx_eq(value, hi) {
        hi
    } else {
        value
    }
}

/// Find `x` in `[lo, hi]` with `f(x) == target` for a monotonically
/// non-decreasing `f`, to within the crate tolerance.
///
/// The probe is expected to be cheap but not trivial (the calculators
/// rebuild a candidate traversal per probe), so the depth is bounded
/// rather than tolerance-only.
pub fn binary_search<F>(f: F, target: f64, lo: f64, hi: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    debug_assert!(hi >= lo);
    let mut lo = lo;
    let mut hi = hi;
    let mut mid = 0.5 * (lo + hi);
    for _ in 0..BINARY_SEARCH_DEPTH {
        mid = 0.5 * (lo + hi);
        let value = f(mid);
        if approx_eq(value, target) {
            break;
        }
        if value < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    mid
}

/// Smallest strictly positive real root, treating roots within tolerance of
/// zero as zero-magnitude artifacts (skipped).
pub fn min_positive_real_root(roots: &Roots<f64>) -> Option<f64> {
    roots
        .as_ref()
        .iter()
        .copied()
        .filter(|r| *r > EPSILON)
        .fold(None, |best, r| match best {
            Some(b) if b <= r => Some(b),
            _ => Some(r),
        })
}

/// Largest strictly negative real root, with the same zero-artifact
/// filtering as [`min_positive_real_root`].
pub fn max_negative_real_root(roots: &Roots<f64>) -> Option<f64> {
    roots
        .as_ref()
        .iter()
        .copied()
        .filter(|r| *r < -EPSILON)
        .fold(None, |best, r| match best {
            Some(b) if b >= r => Some(b),
            _ => Some(r),
        })
}
