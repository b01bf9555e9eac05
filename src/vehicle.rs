// src/vehicle.rs - Immutable vehicle constraint record

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraversalError};
use crate::numeric;

/// Hard kinematic limits for one vehicle class.
///
/// Shared read-only across planning calls; derived variants (`scale`,
/// `fastest`, `slowest`) are new instances, never in-place mutations.
///
/// Sign conventions: acceleration and the two jerks that increase
/// acceleration are positive, deceleration and the two jerks that decrease
/// acceleration are negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleMotionProperties {
    /// Maximum speed (m/s), > 0
    pub max_speed: f64,

    /// Maximum acceleration (m/s²), > 0
    pub acceleration: f64,

    /// Maximum deceleration (m/s²), < 0
    pub deceleration: f64,

    /// Jerk ramping acceleration from 0 towards `acceleration` (m/s³), > 0
    pub jerk_acceleration_up: f64,

    /// Jerk ramping acceleration back to 0 (m/s³), < 0
    pub jerk_acceleration_down: f64,

    /// Jerk ramping acceleration from 0 towards `deceleration` (m/s³), < 0
    pub jerk_deceleration_up: f64,

    /// Jerk ramping deceleration back to 0 (m/s³), > 0
    pub jerk_deceleration_down: f64,

    /// Symmetric tolerance on `max_speed` (m/s), >= 0
    #[serde(default)]
    pub speed_tolerance: f64,

    /// Symmetric tolerance on `acceleration` (m/s²), >= 0
    #[serde(default)]
    pub acceleration_tolerance: f64,

    /// Symmetric tolerance on the magnitude of `deceleration` (m/s²), >= 0
    #[serde(default)]
    pub deceleration_tolerance: f64,
}

impl VehicleMotionProperties {
    /// Build a property set without tolerances.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        max_speed: f64,
        acceleration: f64,
        deceleration: f64,
        jerk_acceleration_up: f64,
        jerk_acceleration_down: f64,
        jerk_deceleration_up: f64,
        jerk_deceleration_down: f64,
    ) -> Result<Self> {
        Self::with_tolerances(
            max_speed,
            acceleration,
            deceleration,
            jerk_acceleration_up,
            jerk_acceleration_down,
            jerk_deceleration_up,
            jerk_deceleration_down,
            0.0,
            0.0,
            0.0,
        )
    }

    /// Build a property set with symmetric speed/accel/decel tolerances.
    #[allow(clippy::too_many_arguments)]
    pub fn with_tolerances(
        max_speed: f64,
        acceleration: f64,
        deceleration: f64,
        jerk_acceleration_up: f64,
        jerk_acceleration_down: f64,
        jerk_deceleration_up: f64,
        jerk_deceleration_down: f64,
        speed_tolerance: f64,
        acceleration_tolerance: f64,
        deceleration_tolerance: f64,
    ) -> Result<Self> {
        let props = Self {
            max_speed,
            acceleration,
            deceleration,
            jerk_acceleration_up,
            jerk_acceleration_down,
            jerk_deceleration_up,
            jerk_deceleration_down,
            speed_tolerance,
            acceleration_tolerance,
            deceleration_tolerance,
        };
        props.validate()?;
        Ok(props)
    }

    /// Re-check every sign/ordering invariant. Used by the constructors and
    /// by the config layer after deserialization.
    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, message: &str) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(TraversalError::InvalidArgument(message.to_string()))
            }
        }

        check(
            self.max_speed.is_finite() && self.max_speed > 0.0,
            "max_speed must be positive",
        )?;
        check(
            self.acceleration.is_finite() && self.acceleration > 0.0,
            "acceleration must be positive",
        )?;
        check(
            self.deceleration.is_finite() && self.deceleration < 0.0,
            "deceleration must be negative",
        )?;
        check(
            self.jerk_acceleration_up.is_finite() && self.jerk_acceleration_up > 0.0,
            "jerk_acceleration_up must be positive",
        )?;
        check(
            self.jerk_acceleration_down.is_finite() && self.jerk_acceleration_down < 0.0,
            "jerk_acceleration_down must be negative",
        )?;
        check(
            self.jerk_deceleration_up.is_finite() && self.jerk_deceleration_up < 0.0,
            "jerk_deceleration_up must be negative",
        )?;
        check(
            self.jerk_deceleration_down.is_finite() && self.jerk_deceleration_down > 0.0,
            "jerk_deceleration_down must be positive",
        )?;
        check(
            self.speed_tolerance >= 0.0 && self.speed_tolerance < self.max_speed,
            "speed_tolerance must be non-negative and smaller than max_speed",
        )?;
        check(
            self.acceleration_tolerance >= 0.0 && self.acceleration_tolerance < self.acceleration,
            "acceleration_tolerance must be non-negative and smaller than acceleration",
        )?;
        check(
            self.deceleration_tolerance >= 0.0
                && self.deceleration_tolerance < self.deceleration.abs(),
            "deceleration_tolerance must be non-negative and smaller than |deceleration|",
        )?;
        Ok(())
    }

    /// New instance with every limit, jerk, and tolerance multiplied by
    /// `factor` (> 0).
    pub fn scale(&self, factor: f64) -> Result<Self> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(TraversalError::InvalidArgument(format!(
                "scale factor must be positive, got {factor}"
            )));
        }
        Self::with_tolerances(
            self.max_speed * factor,
            self.acceleration * factor,
            self.deceleration * factor,
            self.jerk_acceleration_up * factor,
            self.jerk_acceleration_down * factor,
            self.jerk_deceleration_up * factor,
            self.jerk_deceleration_down * factor,
            self.speed_tolerance * factor,
            self.acceleration_tolerance * factor,
            self.deceleration_tolerance * factor,
        )
    }

    /// Variant with the tolerances folded into the limits in the permissive
    /// direction; the derived instance carries zero tolerances.
    pub fn fastest(&self) -> Self {
        Self {
            max_speed: self.max_speed + self.speed_tolerance,
            acceleration: self.acceleration + self.acceleration_tolerance,
            deceleration: self.deceleration - self.deceleration_tolerance,
            speed_tolerance: 0.0,
            acceleration_tolerance: 0.0,
            deceleration_tolerance: 0.0,
            ..*self
        }
    }

    /// Variant with the tolerances folded into the limits in the restrictive
    /// direction; the derived instance carries zero tolerances.
    pub fn slowest(&self) -> Self {
        Self {
            max_speed: self.max_speed - self.speed_tolerance,
            acceleration: self.acceleration - self.acceleration_tolerance,
            deceleration: self.deceleration + self.deceleration_tolerance,
            speed_tolerance: 0.0,
            acceleration_tolerance: 0.0,
            deceleration_tolerance: 0.0,
            ..*self
        }
    }

    /// Fuzzy value equality under the crate tolerance policy. Derived
    /// `PartialEq` stays bit-exact for determinism checks; this is the
    /// comparison planning code should use.
    pub fn approx_eq(&self, other: &Self) -> bool {
        numeric::approx_eq(self.max_speed, other.max_speed)
            && numeric::approx_eq(self.acceleration, other.acceleration)
            && numeric::approx_eq(self.deceleration, other.deceleration)
            && numeric::approx_eq(self.jerk_acceleration_up, other.jerk_acceleration_up)
            && numeric::approx_eq(self.jerk_acceleration_down, other.jerk_acceleration_down)
            && numeric::approx_eq(self.jerk_deceleration_up, other.jerk_deceleration_up)
            && numeric::approx_eq(self.jerk_deceleration_down, other.jerk_deceleration_down)
            && numeric::approx_eq(self.speed_tolerance, other.speed_tolerance)
            && numeric::approx_eq(self.acceleration_tolerance, other.acceleration_tolerance)
            && numeric::approx_eq(self.deceleration_tolerance, other.deceleration_tolerance)
    }
}
