//! Shared data types.

mod pose;
mod scan;
mod timestamped;

pub use pose::{Pose2D, Quaternion};
pub use scan::{LaserScan, PolarScan};
pub use timestamped::Timestamped;
