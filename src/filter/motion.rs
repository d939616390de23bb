//! Odometry motion model.
//!
//! Propagates every particle by the measured odometric displacement,
//! decomposed into a rotate-translate-rotate triple, with independent
//! zero-mean Gaussian noise injected per particle per sub-step. The
//! independent draws are what keep the cloud from collapsing onto a single
//! trajectory.

use rand::Rng;
use serde::Deserialize;

use crate::core::math::angle_diff;
use crate::core::types::Pose2D;

use super::particle::ParticleCloud;
use super::sample_gaussian;

/// Fixed standard deviations for the motion noise.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MotionNoiseConfig {
    /// Noise on each of the two rotation sub-steps, radians.
    pub sigma_turn: f32,
    /// Noise on the translation sub-step, meters.
    pub sigma_dist: f32,
}

impl Default for MotionNoiseConfig {
    fn default() -> Self {
        Self {
            sigma_turn: 0.01,
            sigma_dist: 0.1,
        }
    }
}

impl MotionNoiseConfig {
    /// No noise at all. Makes the propagation deterministic; used by tests
    /// and useful when replaying recorded trajectories.
    pub fn noiseless() -> Self {
        Self {
            sigma_turn: 0.0,
            sigma_dist: 0.0,
        }
    }

    /// Looser noise for slippery floors or poor encoders.
    pub fn high_noise() -> Self {
        Self {
            sigma_turn: 0.05,
            sigma_dist: 0.25,
        }
    }
}

/// Rotate-translate-rotate odometry motion model.
#[derive(Debug, Clone)]
pub struct MotionModel {
    config: MotionNoiseConfig,
}

impl MotionModel {
    /// Create a new motion model.
    pub fn new(config: MotionNoiseConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &MotionNoiseConfig {
        &self.config
    }

    /// Advance the cloud by the displacement from `previous` to `current`
    /// (both in the odometry frame).
    ///
    /// The displacement is decomposed as: turn to face the direction of
    /// travel, drive the straight-line distance, turn to the final heading.
    /// Each particle samples its own noise for each sub-step.
    pub fn apply<R: Rng>(
        &self,
        cloud: &mut ParticleCloud,
        previous: &Pose2D,
        current: &Pose2D,
        rng: &mut R,
    ) {
        let dx = current.x - previous.x;
        let dy = current.y - previous.y;

        let heading_of_travel = dy.atan2(dx);
        let theta1 = angle_diff(previous.theta, heading_of_travel);
        let dist = (dx * dx + dy * dy).sqrt();
        let theta2 = angle_diff(heading_of_travel, current.theta);

        for p in cloud.iter_mut() {
            p.turn(theta1 + sample_gaussian(rng, self.config.sigma_turn));
            p.drive(dist + sample_gaussian(rng, self.config.sigma_dist));
            p.turn(theta2 + sample_gaussian(rng, self.config.sigma_turn));
        }
    }
}
