//! Planar pose and orientation types.

use serde::{Deserialize, Serialize};

use crate::core::math::normalize_angle;

/// Robot pose in 2D space.
///
/// Position (x, y) in meters and heading (theta) in radians. Theta is
/// normalized to [-π, π] on construction; arithmetic on headings must go
/// through [`crate::core::math`], never naive subtraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in meters
    pub x: f32,
    /// Y position in meters
    pub y: f32,
    /// Heading in radians, normalized to [-π, π]
    pub theta: f32,
}

impl Pose2D {
    /// Create a new pose with theta normalized to [-π, π].
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    /// Identity pose at the origin with zero heading.
    #[inline]
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    /// Euclidean distance to another pose's position.
    #[inline]
    pub fn distance(&self, other: &Pose2D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Pose2D {
    fn default() -> Self {
        Self::identity()
    }
}

/// Unit quaternion, used only for publishing planar headings to consumers
/// that expect a 3D orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    /// Quaternion for a pure yaw rotation (roll and pitch are zero for a
    /// planar robot).
    #[inline]
    pub fn from_yaw(theta: f32) -> Self {
        let half = theta * 0.5;
        Self {
            x: 0.0,
            y: 0.0,
            z: half.sin(),
            w: half.cos(),
        }
    }

    /// Recover the yaw angle.
    #[inline]
    pub fn yaw(&self) -> f32 {
        2.0 * self.z.atan2(self.w)
    }
}
