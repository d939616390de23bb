//! Synthetic collaborators for tests and the demo binary.
//!
//! [`GridWorld`] implements the obstacle-distance query over a boolean
//! occupancy grid and can ray-cast laser scans from a ground-truth pose;
//! [`OdometryLog`] implements the transform provider over a bounded history
//! of timestamped odometry poses.

mod odometry;
mod world;

pub use odometry::{OdometryLog, SharedOdometry};
pub use world::{GridWorld, GridWorldConfig};
