//! Timestamped odometry history implementing the transform provider.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::core::math::{angle_diff, angle_lerp};
use crate::core::types::{LaserScan, PolarScan, Pose2D, Timestamped};
use crate::engine::{AlignmentError, TransformProvider};

/// Bounded history of odometry poses with timestamp interpolation.
///
/// Alignment semantics match a real transform buffer: a timestamp older than
/// the retained history can never resolve, a timestamp newer than the latest
/// sample may resolve once more odometry arrives.
#[derive(Debug, Clone)]
pub struct OdometryLog {
    history: VecDeque<Timestamped<Pose2D>>,
    capacity: usize,
    correction: Option<Pose2D>,
}

impl OdometryLog {
    /// Create a log retaining at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "interpolation needs at least two samples");
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            correction: None,
        }
    }

    /// Append an odometry sample. Samples must arrive in timestamp order.
    pub fn push(&mut self, timestamp_us: u64, pose: Pose2D) {
        if let Some(last) = self.history.back() {
            debug_assert!(
                timestamp_us >= last.timestamp_us,
                "odometry samples must be monotonic"
            );
        }
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(Timestamped::new(pose, timestamp_us));
    }

    /// Latest odometry sample, if any.
    pub fn latest(&self) -> Option<&Timestamped<Pose2D>> {
        self.history.back()
    }

    /// The last map→odom correction received from the estimator.
    pub fn correction(&self) -> Option<Pose2D> {
        self.correction
    }
}

impl TransformProvider for OdometryLog {
    fn aligned_pose_at(&self, timestamp_us: u64) -> Result<Pose2D, AlignmentError> {
        let (Some(oldest), Some(newest)) = (self.history.front(), self.history.back()) else {
            return Err(AlignmentError::NotYetAvailable);
        };
        if timestamp_us < oldest.timestamp_us {
            return Err(AlignmentError::TooOld);
        }
        if timestamp_us > newest.timestamp_us {
            return Err(AlignmentError::NotYetAvailable);
        }

        for (a, b) in self.history.iter().zip(self.history.iter().skip(1)) {
            if timestamp_us < a.timestamp_us || timestamp_us > b.timestamp_us {
                continue;
            }
            if a.timestamp_us == b.timestamp_us {
                return Ok(a.data);
            }
            let t = (timestamp_us - a.timestamp_us) as f32
                / (b.timestamp_us - a.timestamp_us) as f32;
            return Ok(Pose2D::new(
                a.data.x + t * (b.data.x - a.data.x),
                a.data.y + t * (b.data.y - a.data.y),
                angle_lerp(a.data.theta, b.data.theta, t),
            ));
        }
        // Single-sample history with an exact timestamp match.
        Ok(newest.data)
    }

    fn scan_to_polar(&self, scan: &LaserScan) -> PolarScan {
        let ranges = scan
            .ranges
            .iter()
            .map(|&r| if scan.is_valid_range(r) { r } else { f32::INFINITY })
            .collect();
        let bearings = (0..scan.len()).map(|i| scan.angle_at(i)).collect();
        PolarScan::new(ranges, bearings)
    }

    fn apply_map_odom_correction(&mut self, estimate: &Pose2D, odom_pose: &Pose2D) {
        let correction = Pose2D::new(
            estimate.x - odom_pose.x,
            estimate.y - odom_pose.y,
            angle_diff(odom_pose.theta, estimate.theta),
        );
        log::debug!(
            "map→odom correction: ({:.3}, {:.3}, {:.3})",
            correction.x,
            correction.y,
            correction.theta
        );
        self.correction = Some(correction);
    }
}

/// Cloneable handle to an [`OdometryLog`] shared between the odometry
/// producer and the localization thread.
#[derive(Debug, Clone)]
pub struct SharedOdometry {
    inner: Arc<Mutex<OdometryLog>>,
}

impl SharedOdometry {
    /// Wrap a log for sharing.
    pub fn new(log: OdometryLog) -> Self {
        Self {
            inner: Arc::new(Mutex::new(log)),
        }
    }

    /// Append an odometry sample.
    pub fn push(&self, timestamp_us: u64, pose: Pose2D) {
        self.inner.lock().expect("odometry lock poisoned").push(timestamp_us, pose);
    }

    /// The last map→odom correction received from the estimator.
    pub fn correction(&self) -> Option<Pose2D> {
        self.inner.lock().expect("odometry lock poisoned").correction()
    }

    /// Latest odometry sample, if any.
    pub fn latest(&self) -> Option<Timestamped<Pose2D>> {
        self.inner
            .lock()
            .expect("odometry lock poisoned")
            .latest()
            .cloned()
    }
}

impl TransformProvider for SharedOdometry {
    fn aligned_pose_at(&self, timestamp_us: u64) -> Result<Pose2D, AlignmentError> {
        self.inner
            .lock()
            .expect("odometry lock poisoned")
            .aligned_pose_at(timestamp_us)
    }

    fn scan_to_polar(&self, scan: &LaserScan) -> PolarScan {
        self.inner
            .lock()
            .expect("odometry lock poisoned")
            .scan_to_polar(scan)
    }

    fn apply_map_odom_correction(&mut self, estimate: &Pose2D, odom_pose: &Pose2D) {
        self.inner
            .lock()
            .expect("odometry lock poisoned")
            .apply_map_odom_correction(estimate, odom_pose);
    }
}
