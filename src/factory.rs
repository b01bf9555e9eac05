// src/factory.rs - Constant-jerk section synthesis
//
// Rest-to-rest plans are produced by an ordered chain of feasibility cases,
// classified by which of the three limits (max acceleration, max
// deceleration, max speed) the profile reaches. Each case returns Ok(None)
// when the requested distance is inconsistent with its limit combination and
// the caller falls through to the next case; the ordering is a documented
// contract:
//
//   1. triangular_case        - no limit reached (4 jerk phases)
//   2. max_speed_case         - max speed reached, cruise inserted
//   3. single_limit_case      - exactly one of accel/decel saturated
//   4. both_limits_case       - accel and decel saturated, below max speed
//
// The mid-motion helpers (braking, ramp-and-brake, ramp-cruise-brake) build
// partial plans for non-zero initial speed/acceleration on behalf of the
// calculators.

use roots::{find_roots_cubic, find_roots_quadratic, find_roots_quartic};
use tracing::trace;

use crate::error::{Result, TraversalError};
use crate::numeric::{self, EPSILON};
use crate::section::{
    ConstantAccelerationSection, ConstantJerkSection, ConstantSpeedSection, TraversalSection,
};
use crate::vehicle::VehicleMotionProperties;

/// Durations this far below zero are defects rather than rounding noise.
const DURATION_DEFECT: f64 = 1e-6;

/// Speed gained by a full jerk triangle per unit peak-acceleration squared:
/// `dv = k * a_peak^2`.
fn accel_gain_per_peak_sq(props: &VehicleMotionProperties) -> f64 {
    0.5 * (1.0 / props.jerk_acceleration_up - 1.0 / props.jerk_acceleration_down)
}

/// Speed shed by a full jerk triangle on the deceleration side per unit
/// peak-deceleration-magnitude squared: `dv = q * p^2`.
fn decel_drop_per_peak_sq(props: &VehicleMotionProperties) -> f64 {
    0.5 * (1.0 / props.jerk_deceleration_down - 1.0 / props.jerk_deceleration_up)
}

/// Distance of a rest-to-peak-to-rest acceleration jerk triangle per unit
/// peak cubed: `s = k3 * a_peak^3`.
fn accel_triangle_distance_per_peak_cubed(props: &VehicleMotionProperties) -> f64 {
    let ju = props.jerk_acceleration_up;
    let jd = props.jerk_acceleration_down;
    1.0 / (6.0 * ju * ju) - 1.0 / (2.0 * ju * jd) + 1.0 / (3.0 * jd * jd)
}

/// Distance of a deceleration jerk triangle that sheds its entire entry
/// speed, per unit peak-magnitude cubed: `s = d3 * p^3`.
fn decel_triangle_distance_per_peak_cubed(props: &VehicleMotionProperties) -> f64 {
    let q = decel_drop_per_peak_sq(props);
    let ju_abs = props.jerk_deceleration_up.abs();
    let jd = props.jerk_deceleration_down;
    q / ju_abs - 1.0 / (6.0 * ju_abs * ju_abs) + (q - 1.0 / (2.0 * ju_abs)) / jd
        - 1.0 / (3.0 * jd * jd)
}

/// Accelerating trapezoid (saturated at the acceleration limit) distance as
/// a quadratic in the exit speed: `s = c.0*v^2 + c.1*v + c.2`.
fn accel_trapezoid_distance_coefficients(props: &VehicleMotionProperties) -> (f64, f64, f64) {
    let a = props.acceleration;
    let ju = props.jerk_acceleration_up;
    let jd = props.jerk_acceleration_down;
    let dv_up = a * a / (2.0 * ju);
    let dv_tri = a * a * accel_gain_per_peak_sq(props);
    let s_up = a * a * a / (6.0 * ju * ju);
    let c2 = 1.0 / (2.0 * a);
    let c1 = dv_up / a - dv_tri / a - a / jd;
    let c0 = s_up - dv_up * dv_tri / a + dv_tri * dv_tri / (2.0 * a) - a * a * a / (6.0 * jd * jd);
    (c2, c1, c0)
}

/// Decelerating trapezoid (saturated at the deceleration limit) distance as
/// a quadratic in the entry speed: `s = c.0*v^2 + c.1*v + c.2`.
fn decel_trapezoid_distance_coefficients(props: &VehicleMotionProperties) -> (f64, f64, f64) {
    let b = props.deceleration.abs();
    let ju_abs = props.jerk_deceleration_up.abs();
    let jd = props.jerk_deceleration_down;
    let dv_tri = b * b * decel_drop_per_peak_sq(props);
    let half_up = b * b / (2.0 * ju_abs);
    let c2 = 1.0 / (2.0 * b);
    let c1 = b / (2.0 * ju_abs);
    let c0 = -b * b * b / (6.0 * ju_abs * ju_abs)
        + (2.0 * half_up * dv_tri - dv_tri * dv_tri) / (2.0 * b)
        + b * b * b / (6.0 * jd * jd);
    (c2, c1, c0)
}

/// Running kinematic state while assembling a contiguous section sequence.
/// Sections shorter than the tolerance are omitted from the output.
struct SectionChain {
    sections: Vec<TraversalSection>,
    speed: f64,
    acceleration: f64,
}

impl SectionChain {
    fn new(speed: f64, acceleration: f64) -> Self {
        Self {
            sections: Vec::new(),
            speed,
            acceleration,
        }
    }

    fn check_duration(duration: f64) -> Result<bool> {
        if duration < -DURATION_DEFECT {
            return Err(TraversalError::Calculation(format!(
                "derived a negative phase duration {duration}"
            )));
        }
        Ok(duration > EPSILON)
    }

    fn push_jerk(&mut self, jerk: f64, duration: f64) -> Result<()> {
        if !Self::check_duration(duration)? {
            return Ok(());
        }
        let t = duration;
        let final_acceleration = snap_zero(self.acceleration + jerk * t);
        let final_speed = snap_zero(
            self.speed + self.acceleration * t + 0.5 * jerk * t * t,
        );
        let distance = snap_zero(
            self.speed * t + 0.5 * self.acceleration * t * t + jerk * t * t * t / 6.0,
        );
        let section = TraversalSection::ConstantJerk(ConstantJerkSection::new(
            t,
            distance,
            jerk,
            self.acceleration,
            final_acceleration,
            self.speed,
            final_speed,
        )?);
        self.speed = final_speed;
        self.acceleration = final_acceleration;
        self.sections.push(section);
        Ok(())
    }

    fn push_hold(&mut self, duration: f64) -> Result<()> {
        if !Self::check_duration(duration)? {
            return Ok(());
        }
        let t = duration;
        let final_speed = snap_zero(self.speed + self.acceleration * t);
        let distance = snap_zero(self.speed * t + 0.5 * self.acceleration * t * t);
        let section = TraversalSection::ConstantAcceleration(ConstantAccelerationSection::new(
            t,
            distance,
            self.acceleration,
            self.speed,
            final_speed,
        )?);
        self.speed = final_speed;
        self.sections.push(section);
        Ok(())
    }

    fn push_cruise(&mut self, duration: f64) -> Result<()> {
        if !Self::check_duration(duration)? {
            return Ok(());
        }
        debug_assert!(numeric::approx_zero(self.acceleration));
        let section = TraversalSection::ConstantSpeed(ConstantSpeedSection::new(
            duration,
            self.speed * duration,
            self.speed,
        )?);
        self.sections.push(section);
        Ok(())
    }

    fn total_distance(&self) -> f64 {
        self.sections.iter().map(TraversalSection::total_distance).sum()
    }

    fn finish(self) -> Vec<TraversalSection> {
        self.sections
    }
}

fn snap_zero(value: f64) -> f64 {
    if numeric::approx_zero(value) { 0.0 } else { value }
}

/// Accelerate the chain from its current state (acceleration >= 0) to
/// exactly `target_speed`, saturating at the acceleration limit when the
/// speed gain demands it.
fn ramp_to_speed(
    chain: &mut SectionChain,
    target_speed: f64,
    props: &VehicleMotionProperties,
) -> Result<()> {
    let ju = props.jerk_acceleration_up;
    let jd = props.jerk_acceleration_down;
    let a0 = chain.acceleration;
    let dv = target_speed - chain.speed;
    if dv <= EPSILON && numeric::approx_zero(a0) {
        return Ok(());
    }
    let k = accel_gain_per_peak_sq(props);
    let peak_sq = (dv + a0 * a0 / (2.0 * ju)) / k;
    if peak_sq < 0.0 {
        return Err(TraversalError::Calculation(format!(
            "cannot reach speed {target_speed} from speed {} at acceleration {a0}",
            chain.speed
        )));
    }
    let peak = peak_sq.sqrt();
    if peak < a0 && !numeric::approx_eq(peak, a0) {
        return Err(TraversalError::Calculation(format!(
            "relaxing acceleration {a0} alone overshoots target speed {target_speed}"
        )));
    }
    if numeric::approx_le(peak, props.acceleration) {
        let peak = peak.min(props.acceleration);
        chain.push_jerk(ju, (peak - a0) / ju)?;
        chain.push_jerk(jd, -peak / jd)?;
    } else {
        let a = props.acceleration;
        let gain_up = (a * a - a0 * a0) / (2.0 * ju);
        let gain_down = -a * a / (2.0 * jd);
        chain.push_jerk(ju, (a - a0) / ju)?;
        chain.push_hold((dv - gain_up - gain_down) / a)?;
        chain.push_jerk(jd, -a / jd)?;
    }
    Ok(())
}

/// Decelerate the chain from its current speed (acceleration ~ 0) to rest,
/// saturating at the deceleration limit when the speed demands it.
fn ramp_to_rest(chain: &mut SectionChain, props: &VehicleMotionProperties) -> Result<()> {
    let ju = props.jerk_deceleration_up;
    let jd = props.jerk_deceleration_down;
    let v = chain.speed;
    if v <= EPSILON {
        return Ok(());
    }
    let q = decel_drop_per_peak_sq(props);
    let b = props.deceleration.abs();
    let peak = (v / q).sqrt();
    if numeric::approx_le(peak, b) {
        let peak = peak.min(b);
        chain.push_jerk(ju, -peak / ju)?;
        chain.push_jerk(jd, peak / jd)?;
    } else {
        chain.push_jerk(ju, -b / ju)?;
        chain.push_hold((v - q * b * b) / b)?;
        chain.push_jerk(jd, b / jd)?;
    }
    Ok(())
}

/// Case 1: neither acceleration nor deceleration limit reached, max speed
/// not reached. Pure triangular jerk profile, 4 phases. The total distance
/// is homogeneous of degree 3 in the peak acceleration, so the peak comes
/// out of a cubic.
fn triangular_case(
    distance: f64,
    props: &VehicleMotionProperties,
) -> Result<Option<Vec<TraversalSection>>> {
    let k = accel_gain_per_peak_sq(props);
    let q = decel_drop_per_peak_sq(props);
    let ratio = (k / q).sqrt();
    let k3 = accel_triangle_distance_per_peak_cubed(props);
    let d3 = decel_triangle_distance_per_peak_cubed(props);
    let coefficient = k3 + d3 * ratio * ratio * ratio;

    let roots = find_roots_cubic(coefficient, 0.0, 0.0, -distance);
    let Some(peak_accel) = numeric::min_positive_real_root(&roots) else {
        return Ok(None);
    };
    let peak_decel = ratio * peak_accel;
    let peak_speed = k * peak_accel * peak_accel;
    if !numeric::approx_le(peak_accel, props.acceleration)
        || !numeric::approx_le(peak_decel, props.deceleration.abs())
        || !numeric::approx_le(peak_speed, props.max_speed)
    {
        return Ok(None);
    }
    trace!(peak_accel, peak_decel, peak_speed, "triangular profile");

    let mut chain = SectionChain::new(0.0, 0.0);
    ramp_to_speed(&mut chain, peak_speed, props)?;
    ramp_to_rest(&mut chain, props)?;
    Ok(Some(chain.finish()))
}

/// Case 2: max speed reached. Accelerating and decelerating ramps are built
/// independently; the remainder of the distance is covered by a cruise.
fn max_speed_case(
    distance: f64,
    props: &VehicleMotionProperties,
) -> Result<Option<Vec<TraversalSection>>> {
    let mut chain = SectionChain::new(0.0, 0.0);
    ramp_to_speed(&mut chain, props.max_speed, props)?;
    let ramp_up_distance = chain.total_distance();

    let mut down = SectionChain::new(props.max_speed, 0.0);
    ramp_to_rest(&mut down, props)?;
    let ramp_down_distance = down.total_distance();

    let cruise_distance = distance - ramp_up_distance - ramp_down_distance;
    if cruise_distance < 0.0 && !numeric::approx_eq(ramp_up_distance + ramp_down_distance, distance)
    {
        return Ok(None);
    }
    trace!(cruise_distance, "max-speed profile");
    chain.push_cruise(cruise_distance.max(0.0) / props.max_speed)?;
    let mut sections = chain.finish();
    sections.extend(down.finish());
    Ok(Some(sections))
}

/// True when, growing a triangular profile, the acceleration limit saturates
/// before the deceleration limit: the accelerating triangle at its limit
/// tops out at a lower speed than the decelerating triangle at its own.
fn will_hit_max_acceleration_first(props: &VehicleMotionProperties) -> bool {
    let accel_capacity =
        props.acceleration * props.acceleration * accel_gain_per_peak_sq(props);
    let decel_capacity =
        props.deceleration * props.deceleration * decel_drop_per_peak_sq(props);
    accel_capacity <= decel_capacity
}

/// Positive real roots in ascending order.
fn positive_roots_ascending(roots: &roots::Roots<f64>) -> Vec<f64> {
    let mut out: Vec<f64> = roots
        .as_ref()
        .iter()
        .copied()
        .filter(|r| *r > EPSILON)
        .collect();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Case 3: exactly one of the acceleration/deceleration limits reached, max
/// speed not reached. The saturated side is a trapezoid (quadratic distance
/// in the transition speed), the other side a triangle (cubic in its peak),
/// so the free peak solves a quartic. The minimum positive root that yields
/// a non-negative plateau and respects the remaining limits is the physical
/// one.
fn single_limit_case(
    distance: f64,
    props: &VehicleMotionProperties,
) -> Result<Option<Vec<TraversalSection>>> {
    let k = accel_gain_per_peak_sq(props);
    let q = decel_drop_per_peak_sq(props);

    let transition_speed = if will_hit_max_acceleration_first(props) {
        // Quartic in the deceleration peak magnitude.
        let (c2, c1, c0) = accel_trapezoid_distance_coefficients(props);
        let d3 = decel_triangle_distance_per_peak_cubed(props);
        let roots = find_roots_quartic(c2 * q * q, d3, c1 * q, 0.0, c0 - distance);
        let b = props.deceleration.abs();
        let accel_capacity = props.acceleration * props.acceleration * k;
        positive_roots_ascending(&roots).into_iter().find_map(|peak| {
            let speed = q * peak * peak;
            let plateau = (speed - accel_capacity) / props.acceleration;
            (numeric::approx_le(peak, b)
                && numeric::approx_le(speed, props.max_speed)
                && plateau >= -DURATION_DEFECT)
                .then_some(speed)
        })
    } else {
        // Quartic in the acceleration peak.
        let (c2, c1, c0) = decel_trapezoid_distance_coefficients(props);
        let k3 = accel_triangle_distance_per_peak_cubed(props);
        let roots = find_roots_quartic(c2 * k * k, k3, c1 * k, 0.0, c0 - distance);
        let decel_capacity = props.deceleration * props.deceleration * q;
        positive_roots_ascending(&roots).into_iter().find_map(|peak| {
            let speed = k * peak * peak;
            let plateau = (speed - decel_capacity) / props.deceleration.abs();
            (numeric::approx_le(peak, props.acceleration)
                && numeric::approx_le(speed, props.max_speed)
                && plateau >= -DURATION_DEFECT)
                .then_some(speed)
        })
    };

    let Some(transition_speed) = transition_speed else {
        return Ok(None);
    };
    trace!(transition_speed, "single-limit profile");
    let mut chain = SectionChain::new(0.0, 0.0);
    ramp_to_speed(&mut chain, transition_speed, props)?;
    ramp_to_rest(&mut chain, props)?;
    Ok(Some(chain.finish()))
}

/// Case 4: both limits reached, max speed not reached. Both sides are
/// trapezoids, so the transition speed solves a quadratic; final fallback.
fn both_limits_case(
    distance: f64,
    props: &VehicleMotionProperties,
) -> Result<Option<Vec<TraversalSection>>> {
    let (a2, a1, a0) = accel_trapezoid_distance_coefficients(props);
    let (d2, d1, d0) = decel_trapezoid_distance_coefficients(props);
    let roots = find_roots_quadratic(a2 + d2, a1 + d1, a0 + d0 - distance);

    let accel_capacity =
        props.acceleration * props.acceleration * accel_gain_per_peak_sq(props);
    let decel_capacity =
        props.deceleration * props.deceleration * decel_drop_per_peak_sq(props);
    let speed = positive_roots_ascending(&roots).into_iter().find(|speed| {
        numeric::approx_le(*speed, props.max_speed)
            && (speed - accel_capacity) / props.acceleration >= -DURATION_DEFECT
            && (speed - decel_capacity) / props.deceleration.abs() >= -DURATION_DEFECT
    });
    let Some(speed) = speed else {
        return Ok(None);
    };
    trace!(transition_speed = speed, "both-limits profile");
    let mut chain = SectionChain::new(0.0, 0.0);
    ramp_to_speed(&mut chain, speed, props)?;
    ramp_to_rest(&mut chain, props)?;
    Ok(Some(chain.finish()))
}

/// Rest-to-rest plan for `distance`, trying the feasibility cases in their
/// documented order. The final case is assumed feasible once the earlier
/// ones have been rejected; it failing anyway is a defect.
pub fn create_sections(
    distance: f64,
    props: &VehicleMotionProperties,
) -> Result<Vec<TraversalSection>> {
    if let Some(sections) = triangular_case(distance, props)? {
        return Ok(sections);
    }
    if let Some(sections) = max_speed_case(distance, props)? {
        return Ok(sections);
    }
    if let Some(sections) = single_limit_case(distance, props)? {
        return Ok(sections);
    }
    both_limits_case(distance, props)?.ok_or_else(|| {
        TraversalError::Calculation(format!(
            "no feasibility case produced a profile for distance {distance}"
        ))
    })
}

/// Minimum-time stop from an arbitrary state.
///
/// An initial positive acceleration is first relaxed to zero; a deceleration
/// beyond the limit is raised back through it. Both the plateau-free peak
/// (from a quadratic, maximum negative root) and the plateau-at-the-limit
/// shapes are handled.
pub fn braking_sections(
    initial_speed: f64,
    initial_acceleration: f64,
    props: &VehicleMotionProperties,
) -> Result<Vec<TraversalSection>> {
    let mut chain = SectionChain::new(initial_speed, initial_acceleration);
    let jad = props.jerk_acceleration_down;
    let jdu = props.jerk_deceleration_up;
    let jdd = props.jerk_deceleration_down;
    let b = props.deceleration.abs();

    if chain.acceleration > EPSILON {
        chain.push_jerk(jad, -chain.acceleration / jad)?;
    }

    let a = chain.acceleration;
    let v = chain.speed;
    if v <= EPSILON {
        if a < -EPSILON {
            return Err(TraversalError::Calculation(format!(
                "cannot stop from speed {v} while still decelerating at {a}"
            )));
        }
        return Ok(chain.finish());
    }

    // Speed shed by relaxing the current deceleration straight to zero.
    let relax_drop = a * a / (2.0 * jdd);
    if numeric::approx_eq(relax_drop, v) {
        chain.push_jerk(jdd, -a / jdd)?;
        return Ok(chain.finish());
    }
    if relax_drop > v {
        return Err(TraversalError::Calculation(format!(
            "cannot reach rest without reversing: relaxing deceleration {a} sheds {relax_drop} \
             but only {v} speed remains"
        )));
    }

    if a < props.deceleration && !numeric::approx_eq(a, props.deceleration) {
        // Beyond the deceleration limit: raise through it, plateau, release.
        chain.push_jerk(jdd, (props.deceleration - a) / jdd)?;
        chain.push_hold((chain.speed - b * b / (2.0 * jdd)) / b)?;
        chain.push_jerk(jdd, b / jdd)?;
        return Ok(chain.finish());
    }

    // Plateau-free candidate peak from the speed balance quadratic.
    let c2 = 1.0 / (2.0 * jdu) - 1.0 / (2.0 * jdd);
    let c0 = v - a * a / (2.0 * jdu);
    let roots = find_roots_quadratic(c2, 0.0, c0);
    let Some(peak) = numeric::max_negative_real_root(&roots) else {
        return Err(TraversalError::Calculation(format!(
            "no braking peak deceleration for speed {v} at acceleration {a}"
        )));
    };
    if numeric::approx_ge(peak, props.deceleration) {
        let peak = peak.max(props.deceleration);
        chain.push_jerk(jdu, (peak - a) / jdu)?;
        chain.push_jerk(jdd, -peak / jdd)?;
    } else {
        chain.push_jerk(jdu, (props.deceleration - a) / jdu)?;
        chain.push_hold((chain.speed - b * b / (2.0 * jdd)) / b)?;
        chain.push_jerk(jdd, b / jdd)?;
    }
    Ok(chain.finish())
}

/// Ramp the acceleration up for `ramp_up_duration`, relax it back to zero,
/// then brake to rest. Used by the calculators as the binary-search probe
/// shape when a full ramp overshoots the target distance.
pub fn ramp_and_brake_sections(
    initial_speed: f64,
    initial_acceleration: f64,
    ramp_up_duration: f64,
    props: &VehicleMotionProperties,
) -> Result<Vec<TraversalSection>> {
    let jau = props.jerk_acceleration_up;
    let jad = props.jerk_acceleration_down;
    let mut chain = SectionChain::new(initial_speed, initial_acceleration);
    chain.push_jerk(jau, ramp_up_duration)?;
    chain.push_jerk(jad, -chain.acceleration / jad)?;
    let mut brake = braking_sections(chain.speed, 0.0, props)?;
    let mut sections = chain.finish();
    sections.append(&mut brake);
    Ok(sections)
}

/// Ramp to the acceleration limit, hold it for `hold_duration`, relax, then
/// brake to rest. The binary-search probe shape for the
/// fixed-acceleration-duration case.
pub fn ramp_hold_and_brake_sections(
    initial_speed: f64,
    initial_acceleration: f64,
    hold_duration: f64,
    props: &VehicleMotionProperties,
) -> Result<Vec<TraversalSection>> {
    let jau = props.jerk_acceleration_up;
    let jad = props.jerk_acceleration_down;
    let mut chain = SectionChain::new(initial_speed, initial_acceleration);
    chain.push_jerk(jau, (props.acceleration - initial_acceleration) / jau)?;
    chain.push_hold(hold_duration)?;
    chain.push_jerk(jad, -chain.acceleration / jad)?;
    let mut brake = braking_sections(chain.speed, 0.0, props)?;
    let mut sections = chain.finish();
    sections.append(&mut brake);
    Ok(sections)
}

/// Ramp from the current state to max speed, cruise, then brake, covering
/// exactly `distance`. `None` when the ramps alone overshoot (the calculator
/// handles that with a shorter shape first).
pub fn ramp_cruise_brake_sections(
    initial_speed: f64,
    initial_acceleration: f64,
    distance: f64,
    props: &VehicleMotionProperties,
) -> Result<Option<Vec<TraversalSection>>> {
    let mut chain = SectionChain::new(initial_speed, initial_acceleration);
    ramp_to_speed(&mut chain, props.max_speed, props)?;
    let ramp_distance = chain.total_distance();

    let mut down = SectionChain::new(props.max_speed, 0.0);
    ramp_to_rest(&mut down, props)?;
    let brake_distance = down.total_distance();

    let cruise_distance = distance - ramp_distance - brake_distance;
    if cruise_distance < 0.0 && !numeric::approx_eq(ramp_distance + brake_distance, distance) {
        return Ok(None);
    }
    chain.push_cruise(cruise_distance.max(0.0) / props.max_speed)?;
    let mut sections = chain.finish();
    sections.extend(down.finish());
    Ok(Some(sections))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn props() -> VehicleMotionProperties {
        VehicleMotionProperties::new(5.0, 2.0, -2.0, 4.0, -4.0, -4.0, 4.0).unwrap()
    }

    fn total_distance(sections: &[TraversalSection]) -> f64 {
        sections.iter().map(TraversalSection::total_distance).sum()
    }

    fn assert_contiguous(sections: &[TraversalSection]) {
        for pair in sections.windows(2) {
            assert_relative_eq!(
                pair[0].final_speed(),
                pair[1].initial_speed(),
                epsilon = 1e-9,
                max_relative = 1e-9
            );
            assert_relative_eq!(
                pair[0].final_acceleration(),
                pair[1].initial_acceleration(),
                epsilon = 1e-9,
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn short_distance_is_a_triangular_profile() {
        let sections = triangular_case(1.0, &props()).unwrap().unwrap();
        assert_eq!(sections.len(), 4);
        assert_contiguous(&sections);
        assert_relative_eq!(total_distance(&sections), 1.0, max_relative = 1e-9);
        // with these limits the 1 m profile peaks exactly at the 2 m/s² limit
        assert_relative_eq!(
            sections[0].final_acceleration(),
            2.0,
            max_relative = 1e-9
        );
        assert_eq!(sections.last().unwrap().final_speed(), 0.0);
    }

    #[test]
    fn triangular_case_rejects_distances_that_need_a_limit() {
        assert!(triangular_case(2.0, &props()).unwrap().is_none());
        assert!(triangular_case(100.0, &props()).unwrap().is_none());
    }

    #[test]
    fn long_distance_reaches_max_speed_with_a_cruise() {
        let sections = max_speed_case(100.0, &props()).unwrap().unwrap();
        assert_eq!(sections.len(), 7);
        assert_contiguous(&sections);
        assert_relative_eq!(total_distance(&sections), 100.0, max_relative = 1e-9);
        let cruise = &sections[3];
        assert!(cruise.is_constant_speed());
        assert_relative_eq!(cruise.initial_speed(), 5.0, max_relative = 1e-9);
        // ramps are 7.5 m each, so the cruise covers 85 m
        assert_relative_eq!(cruise.total_distance(), 85.0, max_relative = 1e-9);
    }

    #[test]
    fn max_speed_case_rejects_distances_shorter_than_the_ramps() {
        assert!(max_speed_case(10.0, &props()).unwrap().is_none());
    }

    #[test]
    fn mid_distance_saturates_both_limits_below_max_speed() {
        // s_acc(v) = s_dec(v) = 0.25 v^2 + 0.25 v for these limits, so 10 m
        // gives a transition speed of exactly 4 m/s.
        let sections = both_limits_case(10.0, &props()).unwrap().unwrap();
        assert_eq!(sections.len(), 6);
        assert_contiguous(&sections);
        assert_relative_eq!(total_distance(&sections), 10.0, max_relative = 1e-9);
        let peak_speed = sections[2].final_speed();
        assert_relative_eq!(peak_speed, 4.0, max_relative = 1e-9);
        assert!(sections[1].is_constant_acceleration());
        assert!(sections[4].is_constant_acceleration());
    }

    #[test]
    fn asymmetric_limits_saturate_one_side_first() {
        // weaker deceleration: its triangle tops out at a higher speed than
        // the acceleration triangle, so max accel saturates first
        let props =
            VehicleMotionProperties::new(50.0, 2.0, -3.0, 4.0, -4.0, -4.0, 4.0).unwrap();
        assert!(will_hit_max_acceleration_first(&props));
        let sections = single_limit_case(3.0, &props).unwrap().unwrap();
        assert_contiguous(&sections);
        assert_relative_eq!(total_distance(&sections), 3.0, max_relative = 1e-6);
        // accel side saturated (has a constant-acceleration plateau), decel
        // side still triangular
        assert!(sections.iter().any(|s| s.is_constant_acceleration() && s.is_accelerating()));
        assert!(!sections.iter().any(|s| s.is_constant_acceleration() && s.is_decelerating()));
    }

    #[test]
    fn fallback_order_covers_every_distance() {
        let props = props();
        for distance in [0.25, 0.5, 1.0, 1.5, 3.0, 10.0, 14.9, 15.1, 40.0, 1000.0] {
            let sections = create_sections(distance, &props).unwrap();
            assert_contiguous(&sections);
            assert_relative_eq!(
                total_distance(&sections),
                distance,
                max_relative = 1e-6
            );
            assert_eq!(sections.last().unwrap().final_speed(), 0.0);
            for s in &sections {
                assert!(s.initial_speed() <= props.max_speed + 1e-6);
                assert!(s.final_speed() <= props.max_speed + 1e-6);
            }
        }
    }

    #[test]
    fn braking_from_cruise_speed_sheds_all_speed() {
        let props = props();
        let sections = braking_sections(5.0, 0.0, &props).unwrap();
        assert_contiguous(&sections);
        assert_eq!(sections.last().unwrap().final_speed(), 0.0);
        assert_eq!(sections.last().unwrap().final_acceleration(), 0.0);
        // 5 m/s exceeds the decel triangle capacity (1 m/s), so a plateau
        // at the limit appears
        assert!(sections.iter().any(TraversalSection::is_constant_acceleration));
        assert_relative_eq!(total_distance(&sections), 7.5, max_relative = 1e-9);
    }

    #[test]
    fn braking_from_low_speed_is_plateau_free() {
        let sections = braking_sections(0.5, 0.0, &props()).unwrap();
        assert_eq!(sections.len(), 2);
        assert_contiguous(&sections);
        assert_eq!(sections.last().unwrap().final_speed(), 0.0);
    }

    #[test]
    fn braking_relaxes_positive_acceleration_first() {
        let sections = braking_sections(2.0, 1.0, &props()).unwrap();
        assert_contiguous(&sections);
        assert!(sections[0].is_accelerating());
        assert_relative_eq!(sections[0].initial_acceleration(), 1.0);
        assert_eq!(sections.last().unwrap().final_speed(), 0.0);
    }

    #[test]
    fn braking_distance_is_monotone_in_speed() {
        let props = props();
        let mut last = 0.0;
        for v in [0.1, 0.5, 1.0, 2.0, 3.0, 5.0] {
            let d = total_distance(&braking_sections(v, 0.0, &props).unwrap());
            assert!(d > last);
            last = d;
        }
    }

    #[test]
    fn braking_beyond_the_deceleration_limit_raises_through_it() {
        let props = props();
        let sections = braking_sections(4.0, -3.0, &props).unwrap();
        assert_contiguous(&sections);
        assert_relative_eq!(sections[0].initial_acceleration(), -3.0);
        // every jerk from a0 < D is the positive decel-down jerk
        assert_eq!(sections.last().unwrap().final_speed(), 0.0);
        assert_eq!(sections.last().unwrap().final_acceleration(), 0.0);
    }

    #[test]
    fn braking_rejects_unstoppable_states() {
        // at 1 m/s while decelerating at -4 m/s², relaxing the deceleration
        // alone sheds 2 m/s: the vehicle cannot settle at rest
        assert!(braking_sections(1.0, -4.0, &props()).is_err());
    }

    #[test]
    fn ramp_and_brake_grows_with_ramp_duration() {
        let props = props();
        let short = total_distance(&ramp_and_brake_sections(1.0, 0.0, 0.1, &props).unwrap());
        let long = total_distance(&ramp_and_brake_sections(1.0, 0.0, 0.4, &props).unwrap());
        assert!(long > short);
    }

    #[test]
    fn ramp_cruise_brake_hits_the_distance_exactly() {
        let props = props();
        let sections = ramp_cruise_brake_sections(1.0, 0.0, 60.0, &props)
            .unwrap()
            .unwrap();
        assert_contiguous(&sections);
        assert_relative_eq!(total_distance(&sections), 60.0, max_relative = 1e-9);
        assert!(sections.iter().any(TraversalSection::is_constant_speed));
        assert!(ramp_cruise_brake_sections(1.0, 0.0, 1.0, &props)
            .unwrap()
            .is_none());
    }
}
