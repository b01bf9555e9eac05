// src/section.rs - Kinematic phase models (constant accel / speed / jerk)

use roots::{find_roots_cubic, find_roots_quadratic};
use serde::Serialize;

use crate::error::{Result, TraversalError};
use crate::numeric;

/// Validate a query coordinate against `[0, extent]`, snapping
/// tolerance-sized overshoot to the nearest endpoint.
fn check_range(value: f64, extent: f64, what: &str) -> Result<f64> {
    let snapped = numeric::snap_to_range(value, 0.0, extent);
    if (0.0..=extent).contains(&snapped) {
        Ok(snapped)
    } else {
        Err(TraversalError::InvalidArgument(format!(
            "{what} {value} outside [0, {extent}]"
        )))
    }
}

fn check_consistent(stored: f64, derived: f64, what: &str) -> Result<()> {
    if numeric::approx_eq(stored, derived) {
        Ok(())
    } else {
        Err(TraversalError::InvalidArgument(format!(
            "inconsistent section: {what} stored as {stored} but kinematics give {derived}"
        )))
    }
}

fn check_non_negative(value: f64, what: &str) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TraversalError::InvalidArgument(format!(
            "{what} must be non-negative, got {value}"
        )))
    }
}

/// Phase under constant non-zero acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConstantAccelerationSection {
    duration: f64,
    distance: f64,
    acceleration: f64,
    initial_speed: f64,
    final_speed: f64,
}

impl ConstantAccelerationSection {
    pub fn new(
        duration: f64,
        distance: f64,
        acceleration: f64,
        initial_speed: f64,
        final_speed: f64,
    ) -> Result<Self> {
        check_non_negative(duration, "duration")?;
        check_non_negative(distance, "distance")?;
        check_non_negative(initial_speed, "initial speed")?;
        check_non_negative(final_speed, "final speed")?;
        if numeric::approx_zero(acceleration) {
            return Err(TraversalError::InvalidArgument(
                "constant-acceleration section requires non-zero acceleration".to_string(),
            ));
        }
        if numeric::approx_zero(duration) {
            return Err(TraversalError::InvalidArgument(
                "constant-acceleration section requires positive duration".to_string(),
            ));
        }
        check_consistent(
            final_speed,
            initial_speed + acceleration * duration,
            "final speed",
        )?;
        check_consistent(
            distance,
            initial_speed * duration + 0.5 * acceleration * duration * duration,
            "distance",
        )?;
        Ok(Self {
            duration,
            distance,
            acceleration,
            initial_speed,
            final_speed,
        })
    }

    /// Build from the state at the start of the phase, deriving the finals.
    pub fn from_initial_state(initial_speed: f64, acceleration: f64, duration: f64) -> Result<Self> {
        let final_speed = initial_speed + acceleration * duration;
        let distance = initial_speed * duration + 0.5 * acceleration * duration * duration;
        Self::new(duration, distance, acceleration, initial_speed, final_speed)
    }

    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    fn distance_at_time(&self, time: f64) -> Result<f64> {
        let t = check_range(time, self.duration, "time")?;
        Ok(self.initial_speed * t + 0.5 * self.acceleration * t * t)
    }

    fn time_at_distance(&self, distance: f64) -> Result<f64> {
        let d = check_range(distance, self.distance, "distance")?;
        if numeric::approx_zero(d) {
            return Ok(0.0);
        }
        let roots = find_roots_quadratic(0.5 * self.acceleration, self.initial_speed, -d);
        smallest_root_in_phase(&roots, self.duration).ok_or_else(|| {
            TraversalError::Calculation(format!(
                "no time in [0, {}] reaches distance {d} under constant acceleration",
                self.duration
            ))
        })
    }

    fn speed_at_time(&self, time: f64) -> Result<f64> {
        let t = check_range(time, self.duration, "time")?;
        Ok(self.initial_speed + self.acceleration * t)
    }
}

/// Phase at constant strictly-positive speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConstantSpeedSection {
    duration: f64,
    distance: f64,
    speed: f64,
}

impl ConstantSpeedSection {
    pub fn new(duration: f64, distance: f64, speed: f64) -> Result<Self> {
        check_non_negative(duration, "duration")?;
        check_non_negative(distance, "distance")?;
        if !(speed.is_finite() && speed > 0.0) {
            return Err(TraversalError::InvalidArgument(format!(
                "constant-speed section requires positive speed, got {speed}"
            )));
        }
        if numeric::approx_zero(duration) {
            return Err(TraversalError::InvalidArgument(
                "constant-speed section requires positive duration".to_string(),
            ));
        }
        check_consistent(distance, speed * duration, "distance")?;
        Ok(Self {
            duration,
            distance,
            speed,
        })
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    fn distance_at_time(&self, time: f64) -> Result<f64> {
        let t = check_range(time, self.duration, "time")?;
        Ok(self.speed * t)
    }

    fn time_at_distance(&self, distance: f64) -> Result<f64> {
        let d = check_range(distance, self.distance, "distance")?;
        Ok(d / self.speed)
    }
}

/// Phase under constant non-zero jerk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConstantJerkSection {
    duration: f64,
    distance: f64,
    jerk: f64,
    initial_acceleration: f64,
    final_acceleration: f64,
    initial_speed: f64,
    final_speed: f64,
}

impl ConstantJerkSection {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        duration: f64,
        distance: f64,
        jerk: f64,
        initial_acceleration: f64,
        final_acceleration: f64,
        initial_speed: f64,
        final_speed: f64,
    ) -> Result<Self> {
        check_non_negative(duration, "duration")?;
        check_non_negative(distance, "distance")?;
        check_non_negative(initial_speed, "initial speed")?;
        check_non_negative(final_speed, "final speed")?;
        if numeric::approx_zero(jerk) {
            return Err(TraversalError::InvalidArgument(
                "constant-jerk section requires non-zero jerk".to_string(),
            ));
        }
        if numeric::approx_zero(duration) {
            return Err(TraversalError::InvalidArgument(
                "constant-jerk section requires positive duration".to_string(),
            ));
        }
        let t = duration;
        check_consistent(
            final_acceleration,
            initial_acceleration + jerk * t,
            "final acceleration",
        )?;
        check_consistent(
            final_speed,
            initial_speed + initial_acceleration * t + 0.5 * jerk * t * t,
            "final speed",
        )?;
        check_consistent(
            distance,
            initial_speed * t + 0.5 * initial_acceleration * t * t + jerk * t * t * t / 6.0,
            "distance",
        )?;
        Ok(Self {
            duration,
            distance,
            jerk,
            initial_acceleration,
            final_acceleration,
            initial_speed,
            final_speed,
        })
    }

    /// Build from the state at the start of the phase, deriving the finals.
    pub fn from_initial_state(
        initial_speed: f64,
        initial_acceleration: f64,
        jerk: f64,
        duration: f64,
    ) -> Result<Self> {
        let t = duration;
        let final_acceleration = initial_acceleration + jerk * t;
        let final_speed = initial_speed + initial_acceleration * t + 0.5 * jerk * t * t;
        let distance =
            initial_speed * t + 0.5 * initial_acceleration * t * t + jerk * t * t * t / 6.0;
        Self::new(
            duration,
            distance,
            jerk,
            initial_acceleration,
            final_acceleration,
            initial_speed,
            final_speed,
        )
    }

    pub fn jerk(&self) -> f64 {
        self.jerk
    }

    fn distance_at_time(&self, time: f64) -> Result<f64> {
        let t = check_range(time, self.duration, "time")?;
        Ok(self.initial_speed * t
            + 0.5 * self.initial_acceleration * t * t
            + self.jerk * t * t * t / 6.0)
    }

    /// Inverse of `distance_at_time`. No closed form: extracts the minimum
    /// positive real root of the governing cubic, tolerating a near-zero
    /// negative root as a rounding artifact (returns 0).
    fn time_at_distance(&self, distance: f64) -> Result<f64> {
        let d = check_range(distance, self.distance, "distance")?;
        if numeric::approx_zero(d) {
            return Ok(0.0);
        }
        let roots = find_roots_cubic(
            self.jerk / 6.0,
            0.5 * self.initial_acceleration,
            self.initial_speed,
            -d,
        );
        smallest_root_in_phase(&roots, self.duration).ok_or_else(|| {
            TraversalError::Calculation(format!(
                "no time in [0, {}] reaches distance {d} under constant jerk",
                self.duration
            ))
        })
    }

    fn speed_at_time(&self, time: f64) -> Result<f64> {
        let t = check_range(time, self.duration, "time")?;
        Ok(self.initial_speed + self.initial_acceleration * t + 0.5 * self.jerk * t * t)
    }

    fn acceleration_at_time(&self, time: f64) -> Result<f64> {
        let t = check_range(time, self.duration, "time")?;
        Ok(self.initial_acceleration + self.jerk * t)
    }
}

/// Smallest real root that lies inside `[0, duration]` after snapping
/// tolerance-sized excursions back onto the phase.
fn smallest_root_in_phase(roots: &roots::Roots<f64>, duration: f64) -> Option<f64> {
    roots
        .as_ref()
        .iter()
        .map(|r| numeric::snap_to_range(*r, 0.0, duration))
        .filter(|r| (0.0..=duration).contains(r))
        .fold(None, |best: Option<f64>, r| match best {
            Some(b) if b <= r => Some(b),
            _ => Some(r),
        })
}

/// One phase of a traversal. The set of variants is closed: every plan is a
/// concatenation of these three laws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TraversalSection {
    ConstantAcceleration(ConstantAccelerationSection),
    ConstantSpeed(ConstantSpeedSection),
    ConstantJerk(ConstantJerkSection),
}

impl TraversalSection {
    pub fn duration(&self) -> f64 {
        match self {
            Self::ConstantAcceleration(s) => s.duration,
            Self::ConstantSpeed(s) => s.duration,
            Self::ConstantJerk(s) => s.duration,
        }
    }

    pub fn total_distance(&self) -> f64 {
        match self {
            Self::ConstantAcceleration(s) => s.distance,
            Self::ConstantSpeed(s) => s.distance,
            Self::ConstantJerk(s) => s.distance,
        }
    }

    pub fn initial_speed(&self) -> f64 {
        match self {
            Self::ConstantAcceleration(s) => s.initial_speed,
            Self::ConstantSpeed(s) => s.speed,
            Self::ConstantJerk(s) => s.initial_speed,
        }
    }

    pub fn final_speed(&self) -> f64 {
        match self {
            Self::ConstantAcceleration(s) => s.final_speed,
            Self::ConstantSpeed(s) => s.speed,
            Self::ConstantJerk(s) => s.final_speed,
        }
    }

    pub fn initial_acceleration(&self) -> f64 {
        match self {
            Self::ConstantAcceleration(s) => s.acceleration,
            Self::ConstantSpeed(_) => 0.0,
            Self::ConstantJerk(s) => s.initial_acceleration,
        }
    }

    pub fn final_acceleration(&self) -> f64 {
        match self {
            Self::ConstantAcceleration(s) => s.acceleration,
            Self::ConstantSpeed(_) => 0.0,
            Self::ConstantJerk(s) => s.final_acceleration,
        }
    }

    /// Distance covered `time` seconds into this phase.
    pub fn distance_at_time(&self, time: f64) -> Result<f64> {
        match self {
            Self::ConstantAcceleration(s) => s.distance_at_time(time),
            Self::ConstantSpeed(s) => s.distance_at_time(time),
            Self::ConstantJerk(s) => s.distance_at_time(time),
        }
    }

    /// Time at which `distance` has been covered; inverse of
    /// [`Self::distance_at_time`].
    pub fn time_at_distance(&self, distance: f64) -> Result<f64> {
        match self {
            Self::ConstantAcceleration(s) => s.time_at_distance(distance),
            Self::ConstantSpeed(s) => s.time_at_distance(distance),
            Self::ConstantJerk(s) => s.time_at_distance(distance),
        }
    }

    pub fn speed_at_time(&self, time: f64) -> Result<f64> {
        match self {
            Self::ConstantAcceleration(s) => s.speed_at_time(time),
            Self::ConstantSpeed(s) => {
                check_range(time, s.duration, "time")?;
                Ok(s.speed)
            }
            Self::ConstantJerk(s) => s.speed_at_time(time),
        }
    }

    pub fn acceleration_at_time(&self, time: f64) -> Result<f64> {
        match self {
            Self::ConstantAcceleration(s) => {
                check_range(time, s.duration, "time")?;
                Ok(s.acceleration)
            }
            Self::ConstantSpeed(s) => {
                check_range(time, s.duration, "time")?;
                Ok(0.0)
            }
            Self::ConstantJerk(s) => s.acceleration_at_time(time),
        }
    }

    pub fn speed_at_distance(&self, distance: f64) -> Result<f64> {
        let t = self.time_at_distance(distance)?;
        self.speed_at_time(t)
    }

    pub fn acceleration_at_distance(&self, distance: f64) -> Result<f64> {
        let t = self.time_at_distance(distance)?;
        self.acceleration_at_time(t)
    }

    /// Speed is rising across this phase.
    pub fn is_accelerating(&self) -> bool {
        match self {
            Self::ConstantAcceleration(s) => s.acceleration > 0.0,
            Self::ConstantSpeed(_) => false,
            Self::ConstantJerk(s) => {
                s.final_speed > s.initial_speed && !numeric::approx_eq(s.final_speed, s.initial_speed)
            }
        }
    }

    /// Speed is falling across this phase.
    pub fn is_decelerating(&self) -> bool {
        match self {
            Self::ConstantAcceleration(s) => s.acceleration < 0.0,
            Self::ConstantSpeed(_) => false,
            Self::ConstantJerk(s) => {
                s.final_speed < s.initial_speed && !numeric::approx_eq(s.final_speed, s.initial_speed)
            }
        }
    }

    pub fn is_constant_speed(&self) -> bool {
        matches!(self, Self::ConstantSpeed(_))
    }

    pub fn is_constant_acceleration(&self) -> bool {
        matches!(self, Self::ConstantAcceleration(_))
    }
}
