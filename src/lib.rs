//! # agv-traversal
//!
//! Time-optimal one-dimensional traversal planning for automated guided
//! vehicles. Given a distance to cover and the vehicle's speed,
//! acceleration, and jerk limits, the planners produce a [`Traversal`]:
//! an ordered sequence of constant-jerk, constant-acceleration, and
//! constant-speed phases that starts from the vehicle's current state and
//! ends at rest, which can then be sampled by time or by distance.
//!
//! ## Example
//!
//! ```
//! use agv_traversal::{
//!     ConstantJerkTraversalCalculator, TraversalCalculator, VehicleMotionProperties,
//! };
//!
//! let props = VehicleMotionProperties::new(1.6, 0.5, -0.5, 1.0, -1.0, -1.0, 1.0)?;
//! let calc = ConstantJerkTraversalCalculator;
//! let traversal = calc.create(12.0, 0.0, 0.0, &props)?;
//! assert!((traversal.total_distance() - 12.0).abs() < 1e-6);
//! let speed = traversal.speed_at_distance(6.0)?;
//! assert!(speed <= props.max_speed + 1e-9);
//! # Ok::<(), agv_traversal::TraversalError>(())
//! ```

pub mod calculator;
pub mod config;
pub mod error;
pub mod factory;
pub mod numeric;
pub mod section;
pub mod segment_graph;
pub mod traversal;
pub mod vehicle;

pub use calculator::{
    ConstantAccelerationTraversalCalculator, ConstantJerkTraversalCalculator, TraversalCalculator,
};
pub use config::{ConfigError, ProfileConfig};
pub use error::{Result, TraversalError};
pub use section::{
    ConstantAccelerationSection, ConstantJerkSection, ConstantSpeedSection, TraversalSection,
};
pub use traversal::Traversal;
pub use vehicle::VehicleMotionProperties;
