//! Laser scan types.

use serde::{Deserialize, Serialize};

/// Raw LiDAR scan in polar coordinates, as delivered by transport.
///
/// A single 360° (or partial) sweep with uniform angular spacing. Non-finite
/// range values mark beams with no return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserScan {
    /// Angle of the first beam in radians (sensor frame)
    pub angle_min: f32,
    /// Angular step between consecutive beams in radians
    pub angle_increment: f32,
    /// Minimum valid range in meters
    pub range_min: f32,
    /// Maximum valid range in meters
    pub range_max: f32,
    /// Range measurements in meters (inf/NaN = no return)
    pub ranges: Vec<f32>,
}

impl LaserScan {
    /// Create a new scan.
    pub fn new(
        angle_min: f32,
        angle_increment: f32,
        range_min: f32,
        range_max: f32,
        ranges: Vec<f32>,
    ) -> Self {
        Self {
            angle_min,
            angle_increment,
            range_min,
            range_max,
            ranges,
        }
    }

    /// Number of beams.
    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Check if the scan has no beams.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Angle of the beam at `index`.
    #[inline]
    pub fn angle_at(&self, index: usize) -> f32 {
        self.angle_min + index as f32 * self.angle_increment
    }

    /// Whether a range reading is a usable return.
    #[inline]
    pub fn is_valid_range(&self, range: f32) -> bool {
        range.is_finite() && range >= self.range_min && range <= self.range_max
    }
}

/// Range observation in the robot body frame.
///
/// Parallel `ranges`/`bearings` sequences aligned by index; this is the form
/// the sensor model consumes. Non-finite ranges mark "no return" and are
/// skipped by [`PolarScan::iter_valid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PolarScan {
    /// Range to the detected surface in meters (inf/NaN = no return)
    pub ranges: Vec<f32>,
    /// Bearing of each beam relative to the robot heading, in radians
    pub bearings: Vec<f32>,
}

impl PolarScan {
    /// Create from parallel range/bearing sequences.
    ///
    /// # Panics
    /// Panics if the sequences differ in length.
    pub fn new(ranges: Vec<f32>, bearings: Vec<f32>) -> Self {
        assert_eq!(
            ranges.len(),
            bearings.len(),
            "ranges and bearings must be index-aligned"
        );
        Self { ranges, bearings }
    }

    /// Number of beams.
    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Check if the observation has no beams.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterate over `(range, bearing)` pairs with a finite return.
    pub fn iter_valid(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.ranges
            .iter()
            .zip(self.bearings.iter())
            .filter(|(r, _)| r.is_finite())
            .map(|(&r, &b)| (r, b))
    }
}
