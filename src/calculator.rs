// src/calculator.rs - Public planning entry points

use tracing::debug;

use crate::error::{Result, TraversalError};
use crate::factory;
use crate::numeric::{self, EPSILON};
use crate::section::{ConstantAccelerationSection, ConstantSpeedSection, TraversalSection};
use crate::traversal::Traversal;
use crate::vehicle::VehicleMotionProperties;

/// A planner that turns a target distance and an initial kinematic state
/// into a complete [`Traversal`].
pub trait TraversalCalculator {
    /// Plan a traversal covering `distance` from the given initial state,
    /// ending at rest.
    fn create(
        &self,
        distance: f64,
        initial_speed: f64,
        initial_acceleration: f64,
        props: &VehicleMotionProperties,
    ) -> Result<Traversal>;

    /// Plan the minimum-time stop from the given state.
    fn braking_traversal(
        &self,
        initial_speed: f64,
        initial_acceleration: f64,
        props: &VehicleMotionProperties,
    ) -> Result<Traversal>;

    /// Plan the minimum-time stop from partway through an existing
    /// traversal: evaluates its state at `distance` and delegates to
    /// [`Self::braking_traversal`].
    fn braking_traversal_from(
        &self,
        traversal: &Traversal,
        distance: f64,
        props: &VehicleMotionProperties,
    ) -> Result<Traversal> {
        let speed = traversal.speed_at_distance(distance)?;
        let acceleration = traversal.acceleration_at_distance(distance)?;
        self.braking_traversal(speed, acceleration, props)
    }
}

fn validate_initial_state(
    initial_speed: f64,
    initial_acceleration: f64,
    props: &VehicleMotionProperties,
) -> Result<()> {
    if !initial_speed.is_finite() || initial_speed < 0.0 {
        return Err(TraversalError::InvalidArgument(format!(
            "initial speed must be finite and non-negative, got {initial_speed}"
        )));
    }
    if !numeric::approx_le(initial_speed, props.max_speed + props.speed_tolerance) {
        return Err(TraversalError::InvalidArgument(format!(
            "initial speed {initial_speed} exceeds max speed {}",
            props.max_speed
        )));
    }
    if !initial_acceleration.is_finite() {
        return Err(TraversalError::InvalidArgument(
            "initial acceleration must be finite".to_string(),
        ));
    }
    Ok(())
}

fn validate_distance(distance: f64) -> Result<()> {
    if distance.is_finite() && distance >= 0.0 {
        Ok(())
    } else {
        Err(TraversalError::InvalidArgument(format!(
            "distance must be finite and non-negative, got {distance}"
        )))
    }
}

/// Jerk-limited planner: every change of acceleration happens at one of the
/// vehicle's four jerk limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantJerkTraversalCalculator;

impl ConstantJerkTraversalCalculator {
    fn plan(
        &self,
        distance: f64,
        initial_speed: f64,
        initial_acceleration: f64,
        props: &VehicleMotionProperties,
    ) -> Result<Traversal> {
        if distance <= EPSILON {
            return Ok(Traversal::EMPTY);
        }
        if numeric::approx_zero(initial_speed) && numeric::approx_zero(initial_acceleration) {
            debug!(distance, "planning from rest");
            return Ok(Traversal::new(factory::create_sections(distance, props)?));
        }

        // (a) The full stop from the current state. If it already covers the
        // target, the whole braking maneuver is returned even when it
        // overshoots: stopping early mid-phase is not modelled.
        let braking = Traversal::new(factory::braking_sections(
            initial_speed,
            initial_acceleration,
            props,
        )?);
        if numeric::approx_ge(braking.total_distance(), distance) {
            debug!(distance, "braking alone covers the target");
            return Ok(braking);
        }

        // (b) Already decelerating: finish the stop, then replan the
        // remainder from rest.
        if initial_acceleration < -EPSILON {
            debug!(distance, "finishing the stop before replanning from rest");
            let remainder = distance - braking.total_distance();
            let rest = self.plan(remainder, 0.0, 0.0, props)?;
            return Ok(braking.chain(rest));
        }

        // (c) Ramp towards max acceleration (bounded by max speed), relax,
        // brake. When the full ramp overshoots, the ramp-up duration is the
        // monotone free parameter for the binary search.
        let jau = props.jerk_acceleration_up;
        let jad = props.jerk_acceleration_down;
        let k = 0.5 * (1.0 / jau - 1.0 / jad);
        let headroom = props.max_speed - initial_speed
            + initial_acceleration * initial_acceleration / (2.0 * jau);
        let speed_bound_peak = if headroom > 0.0 {
            (headroom / k).sqrt()
        } else {
            initial_acceleration
        };
        let reachable_peak = props.acceleration.min(speed_bound_peak).max(initial_acceleration);
        let full_ramp_duration = (reachable_peak - initial_acceleration) / jau;

        let full_ramp = Traversal::new(factory::ramp_and_brake_sections(
            initial_speed,
            initial_acceleration,
            full_ramp_duration,
            props,
        )?);
        if numeric::approx_ge(full_ramp.total_distance(), distance) {
            if numeric::approx_eq(full_ramp.total_distance(), distance) {
                return Ok(full_ramp);
            }
            debug!(distance, "searching the ramp-up duration");
            let probe = |t: f64| match factory::ramp_and_brake_sections(
                initial_speed,
                initial_acceleration,
                t,
                props,
            ) {
                Ok(sections) => sections.iter().map(TraversalSection::total_distance).sum(),
                Err(_) => f64::INFINITY,
            };
            let t = numeric::binary_search(probe, distance, 0.0, full_ramp_duration);
            return Ok(Traversal::new(factory::ramp_and_brake_sections(
                initial_speed,
                initial_acceleration,
                t,
                props,
            )?));
        }

        // (d) Hold max acceleration until max speed, relax, brake. Only
        // reachable when the ramp saturates the acceleration limit; the
        // hold duration is the free parameter otherwise.
        if numeric::approx_eq(reachable_peak, props.acceleration)
            && speed_bound_peak > props.acceleration
        {
            let a = props.acceleration;
            let gain_ramp = (a * a - initial_acceleration * initial_acceleration) / (2.0 * jau)
                - a * a / (2.0 * jad);
            let full_hold_duration = (props.max_speed - initial_speed - gain_ramp) / a;
            let full_hold = Traversal::new(factory::ramp_hold_and_brake_sections(
                initial_speed,
                initial_acceleration,
                full_hold_duration,
                props,
            )?);
            if numeric::approx_ge(full_hold.total_distance(), distance) {
                if numeric::approx_eq(full_hold.total_distance(), distance) {
                    return Ok(full_hold);
                }
                debug!(distance, "searching the hold duration at max acceleration");
                let probe = |t: f64| match factory::ramp_hold_and_brake_sections(
                    initial_speed,
                    initial_acceleration,
                    t,
                    props,
                ) {
                    Ok(sections) => sections.iter().map(TraversalSection::total_distance).sum(),
                    Err(_) => f64::INFINITY,
                };
                let t = numeric::binary_search(probe, distance, 0.0, full_hold_duration);
                return Ok(Traversal::new(factory::ramp_hold_and_brake_sections(
                    initial_speed,
                    initial_acceleration,
                    t,
                    props,
                )?));
            }
        }

        // (e) Ramp to max speed, cruise for the exact remainder, brake.
        debug!(distance, "cruising at max speed for the remainder");
        factory::ramp_cruise_brake_sections(initial_speed, initial_acceleration, distance, props)?
            .map(Traversal::new)
            .ok_or_else(|| {
                TraversalError::Calculation(format!(
                    "ramp-cruise-brake was expected to cover distance {distance}"
                ))
            })
    }
}

impl TraversalCalculator for ConstantJerkTraversalCalculator {
    fn create(
        &self,
        distance: f64,
        initial_speed: f64,
        initial_acceleration: f64,
        props: &VehicleMotionProperties,
    ) -> Result<Traversal> {
        validate_distance(distance)?;
        validate_initial_state(initial_speed, initial_acceleration, props)?;
        self.plan(distance, initial_speed, initial_acceleration, props)
    }

    fn braking_traversal(
        &self,
        initial_speed: f64,
        initial_acceleration: f64,
        props: &VehicleMotionProperties,
    ) -> Result<Traversal> {
        validate_initial_state(initial_speed, initial_acceleration, props)?;
        Ok(Traversal::new(factory::braking_sections(
            initial_speed,
            initial_acceleration,
            props,
        )?))
    }
}

/// Simpler planner that ignores the jerk limits: acceleration switches
/// instantaneously, producing classic triangle/trapezoid speed profiles.
/// The initial acceleration is irrelevant to this model and only validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantAccelerationTraversalCalculator;

impl TraversalCalculator for ConstantAccelerationTraversalCalculator {
    fn create(
        &self,
        distance: f64,
        initial_speed: f64,
        initial_acceleration: f64,
        props: &VehicleMotionProperties,
    ) -> Result<Traversal> {
        validate_distance(distance)?;
        validate_initial_state(initial_speed, initial_acceleration, props)?;
        if distance <= EPSILON {
            return Ok(Traversal::EMPTY);
        }
        let a = props.acceleration;
        let b = props.deceleration.abs();
        let v0 = initial_speed;

        let braking_distance = v0 * v0 / (2.0 * b);
        if numeric::approx_ge(braking_distance, distance) {
            debug!(distance, "braking alone covers the target");
            return self.braking_traversal(initial_speed, initial_acceleration, props);
        }

        // peak speed of the triangular profile through this distance
        let peak = ((2.0 * a * b * distance + b * v0 * v0) / (a + b)).sqrt();
        let peak = peak.min(props.max_speed);
        debug!(distance, peak, "constant-acceleration profile");

        let mut sections = Vec::new();
        if peak > v0 + EPSILON {
            sections.push(TraversalSection::ConstantAcceleration(
                ConstantAccelerationSection::from_initial_state(v0, a, (peak - v0) / a)?,
            ));
        }
        let accel_distance = (peak * peak - v0 * v0) / (2.0 * a);
        let decel_distance = peak * peak / (2.0 * b);
        let cruise_distance = (distance - accel_distance - decel_distance).max(0.0);
        if cruise_distance > EPSILON {
            sections.push(TraversalSection::ConstantSpeed(ConstantSpeedSection::new(
                cruise_distance / peak,
                cruise_distance,
                peak,
            )?));
        }
        sections.push(TraversalSection::ConstantAcceleration(
            ConstantAccelerationSection::from_initial_state(peak, -b, peak / b)?,
        ));
        Ok(Traversal::new(sections))
    }

    fn braking_traversal(
        &self,
        initial_speed: f64,
        initial_acceleration: f64,
        props: &VehicleMotionProperties,
    ) -> Result<Traversal> {
        validate_initial_state(initial_speed, initial_acceleration, props)?;
        if initial_speed <= EPSILON {
            return Ok(Traversal::EMPTY);
        }
        let b = props.deceleration.abs();
        Ok(Traversal::new(vec![
            TraversalSection::ConstantAcceleration(
                ConstantAccelerationSection::from_initial_state(
                    initial_speed,
                    props.deceleration,
                    initial_speed / b,
                )?,
            ),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn props() -> VehicleMotionProperties {
        VehicleMotionProperties::new(5.0, 2.0, -2.0, 4.0, -4.0, -4.0, 4.0).unwrap()
    }

    #[test]
    fn rejects_invalid_input() {
        let calc = ConstantJerkTraversalCalculator;
        assert!(calc.create(-1.0, 0.0, 0.0, &props()).is_err());
        assert!(calc.create(10.0, -1.0, 0.0, &props()).is_err());
        assert!(calc.create(10.0, 7.0, 0.0, &props()).is_err());
        assert!(calc.create(10.0, 0.0, f64::NAN, &props()).is_err());
    }

    #[test]
    fn zero_distance_is_the_empty_traversal() {
        let calc = ConstantJerkTraversalCalculator;
        let t = calc.create(0.0, 0.0, 0.0, &props()).unwrap();
        assert_eq!(t, Traversal::EMPTY);
    }

    #[test]
    fn create_from_rest_covers_the_distance() {
        let calc = ConstantJerkTraversalCalculator;
        for distance in [0.5, 1.0, 10.0, 100.0] {
            let t = calc.create(distance, 0.0, 0.0, &props()).unwrap();
            assert_relative_eq!(t.total_distance(), distance, max_relative = 1e-6);
            assert_eq!(t.final_speed(), 0.0);
        }
    }

    #[test]
    fn at_max_speed_with_short_target_returns_the_braking_traversal() {
        let calc = ConstantJerkTraversalCalculator;
        let braking = calc.braking_traversal(5.0, 0.0, &props()).unwrap();
        let t = calc.create(braking.total_distance(), 5.0, 0.0, &props()).unwrap();
        assert_eq!(t, braking);
        // larger target but still within braking distance: same answer
        let t = calc.create(1.0, 5.0, 0.0, &props()).unwrap();
        assert_eq!(t, braking);
    }

    #[test]
    fn decelerating_start_finishes_the_stop_then_replans() {
        let calc = ConstantJerkTraversalCalculator;
        let t = calc.create(30.0, 3.0, -1.0, &props()).unwrap();
        assert_relative_eq!(t.total_distance(), 30.0, max_relative = 1e-6);
        let braking = calc.braking_traversal(3.0, -1.0, &props()).unwrap();
        // the plan opens with the braking maneuver
        assert_eq!(&t.sections()[..braking.sections().len()], braking.sections());
        assert_eq!(t.final_speed(), 0.0);
    }

    #[test]
    fn mid_motion_short_target_searches_the_ramp_duration() {
        let calc = ConstantJerkTraversalCalculator;
        // from 1 m/s, 2.5 m is too short to reach max accel or max speed
        let t = calc.create(2.5, 1.0, 0.0, &props()).unwrap();
        assert_relative_eq!(t.total_distance(), 2.5, max_relative = 1e-6);
        assert_eq!(t.final_speed(), 0.0);
        assert!(t.duration_at_constant_speed() == 0.0);
    }

    #[test]
    fn mid_motion_long_target_cruises_at_max_speed() {
        let calc = ConstantJerkTraversalCalculator;
        let t = calc.create(60.0, 1.0, 0.5, &props()).unwrap();
        assert_relative_eq!(t.total_distance(), 60.0, max_relative = 1e-6);
        assert!(t.duration_at_constant_speed() > 0.0);
        let top = t
            .sections()
            .iter()
            .find(|s| s.is_constant_speed())
            .unwrap()
            .initial_speed();
        assert_relative_eq!(top, 5.0, max_relative = 1e-9);
    }

    #[test]
    fn mid_motion_medium_target_holds_max_acceleration_briefly() {
        let calc = ConstantJerkTraversalCalculator;
        // long enough to saturate the acceleration limit, too short for a
        // cruise at max speed
        let t = calc.create(12.0, 1.0, 0.0, &props()).unwrap();
        assert_relative_eq!(t.total_distance(), 12.0, max_relative = 1e-6);
        assert_eq!(t.duration_at_constant_speed(), 0.0);
        assert_eq!(t.final_speed(), 0.0);
    }

    #[test]
    fn braking_traversal_from_partway_matches_state_based_overload() {
        let calc = ConstantJerkTraversalCalculator;
        let t = calc.create(100.0, 0.0, 0.0, &props()).unwrap();
        let speed = t.speed_at_distance(50.0).unwrap();
        let accel = t.acceleration_at_distance(50.0).unwrap();
        let from_plan = calc.braking_traversal_from(&t, 50.0, &props()).unwrap();
        let from_state = calc.braking_traversal(speed, accel, &props()).unwrap();
        assert_eq!(from_plan, from_state);
        assert_relative_eq!(speed, 5.0, max_relative = 1e-9);
    }

    #[test]
    fn determinism_bit_identical_plans() {
        let calc = ConstantJerkTraversalCalculator;
        let a = calc.create(37.5, 1.25, 0.5, &props()).unwrap();
        let b = calc.create(37.5, 1.25, 0.5, &props()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn constant_acceleration_triangle_and_trapezoid() {
        let calc = ConstantAccelerationTraversalCalculator;
        // short: triangular, peak below max speed
        let t = calc.create(4.0, 0.0, 0.0, &props()).unwrap();
        assert_eq!(t.sections().len(), 2);
        assert_relative_eq!(t.total_distance(), 4.0, max_relative = 1e-9);
        let peak = t.sections()[0].final_speed();
        assert_relative_eq!(peak, 8.0_f64.sqrt(), max_relative = 1e-9);

        // long: trapezoid with a cruise at max speed
        let t = calc.create(50.0, 0.0, 0.0, &props()).unwrap();
        assert_eq!(t.sections().len(), 3);
        assert_relative_eq!(t.total_distance(), 50.0, max_relative = 1e-9);
        assert!(t.sections()[1].is_constant_speed());
        assert_relative_eq!(t.sections()[1].initial_speed(), 5.0);
    }

    #[test]
    fn constant_acceleration_respects_initial_speed_and_braking() {
        let calc = ConstantAccelerationTraversalCalculator;
        let t = calc.create(20.0, 3.0, 0.0, &props()).unwrap();
        assert_relative_eq!(t.total_distance(), 20.0, max_relative = 1e-9);
        assert_relative_eq!(t.sections()[0].initial_speed(), 3.0);

        // target shorter than the braking distance: full stop returned
        let braking = calc.braking_traversal(4.0, 0.0, &props()).unwrap();
        assert_relative_eq!(braking.total_distance(), 4.0, max_relative = 1e-9);
        let t = calc.create(2.0, 4.0, 0.0, &props()).unwrap();
        assert_eq!(t, braking);
    }
}
