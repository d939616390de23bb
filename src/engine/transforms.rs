//! Coordinate-transform collaborator interface.
//!
//! The estimator never touches transform trees directly; it consumes this
//! trait, implemented by the surrounding system (and by [`crate::sim`] for
//! tests and the demo binary).

use thiserror::Error;

use crate::core::types::{LaserScan, PolarScan, Pose2D};

/// Why a scan could not be time-aligned against odometry history.
///
/// The two cases drive different scheduler behavior: a too-old scan can
/// never be aligned and is dropped permanently, while a not-yet-available
/// alignment is retried on a later cycle.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("scan predates the oldest available odometry")]
    TooOld,

    #[error("odometry for the scan timestamp is not yet available")]
    NotYetAvailable,
}

/// Transform operations the estimator consumes.
pub trait TransformProvider {
    /// Robot pose in the odometry frame at the given timestamp.
    fn aligned_pose_at(&self, timestamp_us: u64) -> Result<Pose2D, AlignmentError>;

    /// Convert a raw range scan into robot-frame polar coordinates.
    fn scan_to_polar(&self, scan: &LaserScan) -> PolarScan;

    /// Reconcile the map→odom correction from a fresh pose estimate and the
    /// odometry pose it was computed against.
    fn apply_map_odom_correction(&mut self, estimate: &Pose2D, odom_pose: &Pose2D);
}
