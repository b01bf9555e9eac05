// src/segment_graph.rs - Generic piecewise evaluation over ordered segments

use crate::error::{Result, TraversalError};
use crate::numeric;

/// Piecewise point lookup: walk `segments` consuming x-extent until `target`
/// falls inside the current segment, then evaluate `value_at` with the local
/// coordinate.
///
/// A target within tolerance past the total extent evaluates the last
/// segment at its end; anything further out is an error (callers are
/// expected to bound their queries).
pub fn interpolate<S, E, V>(segments: &[S], target: f64, extent: E, value_at: V) -> Result<f64>
where
    E: Fn(&S) -> f64,
    V: Fn(&S, f64) -> Result<f64>,
{
    walk(segments, target, extent, |_| 0.0, value_at)
}

/// Piecewise accumulation: as [`interpolate`], but sums `y_extent` over every
/// fully-consumed segment so the returned value is cumulative rather than
/// local.
pub fn accumulate<S, E, Y, V>(
    segments: &[S],
    target: f64,
    extent: E,
    y_extent: Y,
    value_at: V,
) -> Result<f64>
where
    E: Fn(&S) -> f64,
    Y: Fn(&S) -> f64,
    V: Fn(&S, f64) -> Result<f64>,
{
    walk(segments, target, extent, y_extent, value_at)
}

fn walk<S, E, Y, V>(segments: &[S], target: f64, extent: E, y_extent: Y, value_at: V) -> Result<f64>
where
    E: Fn(&S) -> f64,
    Y: Fn(&S) -> f64,
    V: Fn(&S, f64) -> Result<f64>,
{
    if target < 0.0 {
        return Err(TraversalError::InvalidArgument(format!(
            "segment query target must be non-negative, got {target}"
        )));
    }
    let mut consumed_x = 0.0;
    let mut accumulated_y = 0.0;
    for segment in segments {
        let x = extent(segment);
        if numeric::approx_le(target, consumed_x + x) {
            let local = numeric::snap_to_range(target - consumed_x, 0.0, x);
            return Ok(accumulated_y + value_at(segment, local)?);
        }
        consumed_x += x;
        accumulated_y += y_extent(segment);
    }
    Err(TraversalError::InvalidArgument(format!(
        "segment query target {target} exceeds total extent {consumed_x}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    // (x_extent, y_extent) pairs with linear interpolation inside a segment.
    fn segments() -> Vec<(f64, f64)> {
        vec![(1.0, 10.0), (2.0, 40.0), (1.0, 5.0)]
    }

    fn linear(s: &(f64, f64), local: f64) -> Result<f64> {
        Ok(s.1 * local / s.0)
    }

    #[test]
    fn interpolate_finds_the_owning_segment() {
        let segs = segments();
        let v = interpolate(&segs, 2.0, |s| s.0, linear).unwrap();
        // 1.0 into the middle segment
        assert_eq!(v, 20.0);
    }

    #[test]
    fn accumulate_sums_consumed_segments() {
        let segs = segments();
        let v = accumulate(&segs, 2.0, |s| s.0, |s| s.1, linear).unwrap();
        assert_eq!(v, 30.0);
        let end = accumulate(&segs, 4.0, |s| s.0, |s| s.1, linear).unwrap();
        assert_eq!(end, 55.0);
    }

    #[test]
    fn tolerates_boundary_noise_but_rejects_overshoot() {
        let segs = segments();
        let v = accumulate(&segs, 4.0 + 1e-12, |s| s.0, |s| s.1, linear).unwrap();
        assert_eq!(v, 55.0);
        assert!(accumulate(&segs, 4.1, |s| s.0, |s| s.1, linear).is_err());
        assert!(interpolate(&segs, -0.1, |s| s.0, linear).is_err());
    }
}
