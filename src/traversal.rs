// src/traversal.rs - Ordered, immutable composite of traversal sections

use serde::Serialize;

use crate::error::{Result, TraversalError};
use crate::section::TraversalSection;
use crate::segment_graph;

/// A complete motion plan: ordered kinematic phases with precomputed totals.
///
/// Contiguity (final speed/acceleration of section `i` equals the initial
/// values of section `i+1`) is guaranteed by the section factory, not
/// re-validated here.
///
/// Queries past the end saturate instead of erroring: a finished traversal
/// stays at rest, so times beyond the total duration report the full
/// distance and zero speed/acceleration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Traversal {
    sections: Vec<TraversalSection>,
    total_duration: f64,
    total_distance: f64,
}

impl Traversal {
    /// The zero-distance, zero-duration plan.
    pub const EMPTY: Traversal = Traversal {
        sections: Vec::new(),
        total_duration: 0.0,
        total_distance: 0.0,
    };

    pub fn new(sections: Vec<TraversalSection>) -> Self {
        let total_duration = sections.iter().map(TraversalSection::duration).sum();
        let total_distance = sections.iter().map(TraversalSection::total_distance).sum();
        Self {
            sections,
            total_duration,
            total_distance,
        }
    }

    pub fn sections(&self) -> &[TraversalSection] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Speed at the end of the plan (0 for any plan that brakes to rest).
    pub fn final_speed(&self) -> f64 {
        self.sections.last().map_or(0.0, TraversalSection::final_speed)
    }

    /// Acceleration at the end of the plan.
    pub fn final_acceleration(&self) -> f64 {
        self.sections
            .last()
            .map_or(0.0, TraversalSection::final_acceleration)
    }

    /// Distance travelled `time` seconds in; saturates at the total distance.
    pub fn distance_at_time(&self, time: f64) -> Result<f64> {
        check_query(time, "time")?;
        if time >= self.total_duration {
            return Ok(self.total_distance);
        }
        segment_graph::accumulate(
            &self.sections,
            time,
            TraversalSection::duration,
            TraversalSection::total_distance,
            |s, local| s.distance_at_time(local),
        )
    }

    /// Time at which `distance` has been covered; saturates at the total
    /// duration.
    pub fn time_at_distance(&self, distance: f64) -> Result<f64> {
        check_query(distance, "distance")?;
        if distance >= self.total_distance {
            return Ok(self.total_duration);
        }
        segment_graph::accumulate(
            &self.sections,
            distance,
            TraversalSection::total_distance,
            TraversalSection::duration,
            |s, local| s.time_at_distance(local),
        )
    }

    /// Target speed `time` seconds in; 0 once the plan has finished.
    pub fn speed_at_time(&self, time: f64) -> Result<f64> {
        check_query(time, "time")?;
        if time >= self.total_duration {
            return Ok(0.0);
        }
        segment_graph::interpolate(&self.sections, time, TraversalSection::duration, |s, local| {
            s.speed_at_time(local)
        })
    }

    /// Target speed after `distance`; 0 once the plan has finished.
    pub fn speed_at_distance(&self, distance: f64) -> Result<f64> {
        check_query(distance, "distance")?;
        if distance >= self.total_distance {
            return Ok(0.0);
        }
        segment_graph::interpolate(
            &self.sections,
            distance,
            TraversalSection::total_distance,
            |s, local| s.speed_at_distance(local),
        )
    }

    /// Target acceleration `time` seconds in; 0 once the plan has finished.
    pub fn acceleration_at_time(&self, time: f64) -> Result<f64> {
        check_query(time, "time")?;
        if time >= self.total_duration {
            return Ok(0.0);
        }
        segment_graph::interpolate(&self.sections, time, TraversalSection::duration, |s, local| {
            s.acceleration_at_time(local)
        })
    }

    /// Target acceleration after `distance`; 0 once the plan has finished.
    pub fn acceleration_at_distance(&self, distance: f64) -> Result<f64> {
        check_query(distance, "distance")?;
        if distance >= self.total_distance {
            return Ok(0.0);
        }
        segment_graph::interpolate(
            &self.sections,
            distance,
            TraversalSection::total_distance,
            |s, local| s.acceleration_at_distance(local),
        )
    }

    /// Total time spent gaining speed.
    pub fn duration_accelerating(&self) -> f64 {
        self.sections
            .iter()
            .filter(|s| s.is_accelerating())
            .map(TraversalSection::duration)
            .sum()
    }

    /// Total time spent cruising.
    pub fn duration_at_constant_speed(&self) -> f64 {
        self.sections
            .iter()
            .filter(|s| s.is_constant_speed())
            .map(TraversalSection::duration)
            .sum()
    }

    /// Total time spent shedding speed.
    pub fn duration_decelerating(&self) -> f64 {
        self.sections
            .iter()
            .filter(|s| s.is_decelerating())
            .map(TraversalSection::duration)
            .sum()
    }

    /// Concatenate `other` after this plan. The caller is responsible for
    /// state continuity at the seam, as with any factory-produced sequence.
    pub fn chain(mut self, other: Traversal) -> Traversal {
        self.sections.extend(other.sections);
        Traversal::new(self.sections)
    }
}

fn check_query(value: f64, what: &str) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TraversalError::InvalidArgument(format!(
            "query {what} must be finite and non-negative, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::{ConstantAccelerationSection, ConstantJerkSection, ConstantSpeedSection};
    use approx::assert_relative_eq;

    // accelerate 0->4 at a=2 over 4m, cruise 4m/s for 8m, brake 4->0 over 4m
    fn trapezoid() -> Traversal {
        Traversal::new(vec![
            TraversalSection::ConstantAcceleration(
                ConstantAccelerationSection::from_initial_state(0.0, 2.0, 2.0).unwrap(),
            ),
            TraversalSection::ConstantSpeed(ConstantSpeedSection::new(2.0, 8.0, 4.0).unwrap()),
            TraversalSection::ConstantAcceleration(
                ConstantAccelerationSection::from_initial_state(4.0, -2.0, 2.0).unwrap(),
            ),
        ])
    }

    #[test]
    fn totals_are_precomputed_sums() {
        let t = trapezoid();
        assert_relative_eq!(t.total_duration(), 6.0);
        assert_relative_eq!(t.total_distance(), 16.0);
    }

    #[test]
    fn empty_traversal_is_at_rest() {
        assert_eq!(Traversal::EMPTY.total_distance(), 0.0);
        assert_eq!(Traversal::EMPTY.total_duration(), 0.0);
        assert_eq!(Traversal::EMPTY.distance_at_time(3.0).unwrap(), 0.0);
        assert_eq!(Traversal::EMPTY.speed_at_time(3.0).unwrap(), 0.0);
        assert_eq!(Traversal::EMPTY.acceleration_at_distance(0.0).unwrap(), 0.0);
    }

    #[test]
    fn point_queries_cross_section_boundaries() {
        let t = trapezoid();
        assert_relative_eq!(t.distance_at_time(2.0).unwrap(), 4.0);
        assert_relative_eq!(t.distance_at_time(3.0).unwrap(), 8.0);
        assert_relative_eq!(t.speed_at_time(1.0).unwrap(), 2.0);
        assert_relative_eq!(t.speed_at_time(3.0).unwrap(), 4.0);
        assert_relative_eq!(t.speed_at_time(5.0).unwrap(), 2.0);
        assert_relative_eq!(t.acceleration_at_time(5.0).unwrap(), -2.0);
        assert_relative_eq!(t.speed_at_distance(12.0).unwrap(), 4.0);
    }

    #[test]
    fn queries_past_the_end_saturate() {
        let t = trapezoid();
        assert_relative_eq!(t.distance_at_time(100.0).unwrap(), 16.0);
        assert_relative_eq!(t.time_at_distance(100.0).unwrap(), 6.0);
        assert_relative_eq!(t.speed_at_time(100.0).unwrap(), 0.0);
        assert_relative_eq!(t.speed_at_distance(100.0).unwrap(), 0.0);
        assert!(t.speed_at_time(-1.0).is_err());
    }

    #[test]
    fn time_distance_round_trip() {
        let t = trapezoid();
        for d in [0.0, 1.0, 4.0, 7.5, 12.0, 16.0] {
            let at = t.time_at_distance(d).unwrap();
            assert_relative_eq!(t.distance_at_time(at).unwrap(), d, max_relative = 1e-9);
        }
    }

    #[test]
    fn phase_durations_partition_the_plan() {
        let t = trapezoid();
        assert_relative_eq!(t.duration_accelerating(), 2.0);
        assert_relative_eq!(t.duration_at_constant_speed(), 2.0);
        assert_relative_eq!(t.duration_decelerating(), 2.0);

        let jerky = Traversal::new(vec![TraversalSection::ConstantJerk(
            ConstantJerkSection::from_initial_state(0.0, 0.0, 4.0, 1.0).unwrap(),
        )]);
        assert_relative_eq!(jerky.duration_accelerating(), 1.0);
        assert_eq!(jerky.duration_decelerating(), 0.0);
    }

    #[test]
    fn chain_concatenates_sections_and_totals() {
        let t = trapezoid().chain(trapezoid());
        assert_eq!(t.sections().len(), 6);
        assert_relative_eq!(t.total_distance(), 32.0);
    }
}
