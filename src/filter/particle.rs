//! Particle and particle cloud representation.

use rand::Rng;
use serde::Deserialize;

use crate::core::types::Pose2D;

use super::sample_gaussian;

/// A single pose hypothesis with an importance weight.
///
/// The raw weight `w` is an unbounded vote count accumulated by the sensor
/// model, not a calibrated likelihood; `norm_w` is the normalized share and
/// is recomputed by [`ParticleCloud::normalize`], never persisted on its own.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    /// X position in the map frame, meters
    pub x: f32,
    /// Y position in the map frame, meters
    pub y: f32,
    /// Heading in radians; may drift outside [-π, π], downstream trig is
    /// wrap-tolerant
    pub theta: f32,
    /// Raw weight, unbounded and ≥ 0
    pub w: f64,
    /// Normalized weight, valid only after a `normalize()` pass
    pub norm_w: f64,
}

impl Particle {
    /// Create a new particle with unit raw weight.
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self {
            x,
            y,
            theta,
            w: 1.0,
            norm_w: 0.0,
        }
    }

    /// Rotate in place by `delta_theta` radians.
    #[inline]
    pub fn turn(&mut self, delta_theta: f32) {
        self.theta += delta_theta;
    }

    /// Advance `delta_dist` meters along the current heading.
    #[inline]
    pub fn drive(&mut self, delta_dist: f32) {
        self.x += delta_dist * self.theta.cos();
        self.y += delta_dist * self.theta.sin();
    }

    /// The hypothesis as a wrapped pose.
    #[inline]
    pub fn pose(&self) -> Pose2D {
        Pose2D::new(self.x, self.y, self.theta)
    }
}

/// Spread of the initial particle cloud around its seed pose.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct InitConfig {
    /// Position standard deviation in meters.
    pub spread_xy: f32,
    /// Heading standard deviation in radians.
    pub spread_theta: f32,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            spread_xy: 1.0 / 6.0,
            spread_theta: std::f32::consts::PI / 12.0,
        }
    }
}

/// Ordered collection of particles representing the pose belief.
///
/// Size is fixed at construction and constant across the filter lifetime
/// except transiently inside resampling.
#[derive(Debug, Clone, Default)]
pub struct ParticleCloud {
    particles: Vec<Particle>,
}

impl ParticleCloud {
    /// Empty cloud (the pre-initialization state).
    pub fn empty() -> Self {
        Self {
            particles: Vec::new(),
        }
    }

    /// Draw `count` particles from a Gaussian around `seed` with unit raw
    /// weight each, and normalize.
    pub fn from_seed<R: Rng>(count: usize, seed: &Pose2D, init: &InitConfig, rng: &mut R) -> Self {
        let particles = (0..count)
            .map(|_| {
                Particle::new(
                    seed.x + sample_gaussian(rng, init.spread_xy),
                    seed.y + sample_gaussian(rng, init.spread_xy),
                    seed.theta + sample_gaussian(rng, init.spread_theta),
                )
            })
            .collect();
        let mut cloud = Self { particles };
        cloud.normalize();
        cloud
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Check if the cloud has not been initialized yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Read access to the particles.
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable iteration for in-place motion/sensor updates.
    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    /// Replace the whole generation (resampling).
    pub(crate) fn replace(&mut self, particles: Vec<Particle>) {
        self.particles = particles;
    }

    /// Recompute normalized weights so they form a valid distribution.
    ///
    /// A zero or non-finite total (every hypothesis scored zero
    /// corroboration) falls back to a uniform distribution instead of
    /// propagating NaNs into the cloud.
    pub fn normalize(&mut self) {
        let total: f64 = self.particles.iter().map(|p| p.w).sum();
        if total > 0.0 && total.is_finite() {
            for p in &mut self.particles {
                p.norm_w = p.w / total;
            }
        } else {
            log::warn!(
                "particle weights sum to {total}, falling back to uniform distribution"
            );
            let uniform = 1.0 / self.particles.len() as f64;
            for p in &mut self.particles {
                p.norm_w = uniform;
            }
        }
    }

    /// Reduce the cloud to a single best-estimate pose.
    ///
    /// Weighted mean for position; circular mean (sine/cosine accumulation)
    /// for heading, so averaging stays correct across the ±π seam.
    ///
    /// # Panics
    /// Panics if the cloud is empty: requesting an estimate before
    /// initialization is a contract violation.
    pub fn estimate_pose(&mut self) -> Pose2D {
        assert!(
            !self.particles.is_empty(),
            "pose estimate requested on an empty particle cloud"
        );
        self.normalize();

        let mut x_sum = 0.0f64;
        let mut y_sum = 0.0f64;
        let mut cos_sum = 0.0f64;
        let mut sin_sum = 0.0f64;
        for p in &self.particles {
            x_sum += p.x as f64 * p.norm_w;
            y_sum += p.y as f64 * p.norm_w;
            cos_sum += (p.theta as f64).cos() * p.norm_w;
            sin_sum += (p.theta as f64).sin() * p.norm_w;
        }
        let theta = sin_sum.atan2(cos_sum);
        Pose2D::new(x_sum as f32, y_sum as f32, theta as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn cloud_of(parts: Vec<Particle>) -> ParticleCloud {
        let mut cloud = ParticleCloud::empty();
        cloud.replace(parts);
        cloud
    }

    #[test]
    fn turn_and_drive() {
        let mut p = Particle::new(0.0, 0.0, 0.0);
        p.turn(FRAC_PI_2);
        p.drive(2.0);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn normalize_sums_to_one() {
        let mut cloud = cloud_of(vec![
            Particle {
                w: 3.0,
                ..Particle::new(0.0, 0.0, 0.0)
            },
            Particle {
                w: 1.0,
                ..Particle::new(1.0, 0.0, 0.0)
            },
        ]);
        cloud.normalize();
        let sum: f64 = cloud.particles().iter().map(|p| p.norm_w).sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        assert_relative_eq!(cloud.particles()[0].norm_w, 0.75);
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut cloud = cloud_of(vec![
            Particle {
                w: 2.5,
                ..Particle::new(0.0, 0.0, 0.0)
            },
            Particle {
                w: 7.5,
                ..Particle::new(1.0, 0.0, 0.0)
            },
        ]);
        cloud.normalize();
        let first: Vec<f64> = cloud.particles().iter().map(|p| p.norm_w).collect();
        cloud.normalize();
        let second: Vec<f64> = cloud.particles().iter().map(|p| p.norm_w).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn normalize_zero_total_falls_back_to_uniform() {
        let mut cloud = cloud_of(vec![
            Particle {
                w: 0.0,
                ..Particle::new(0.0, 0.0, 0.0)
            },
            Particle {
                w: 0.0,
                ..Particle::new(1.0, 0.0, 0.0)
            },
        ]);
        cloud.normalize();
        for p in cloud.particles() {
            assert_relative_eq!(p.norm_w, 0.5);
        }
    }

    #[test]
    fn circular_mean_near_seam() {
        let mut cloud = cloud_of(vec![
            Particle::new(0.0, 0.0, -PI + 0.01),
            Particle::new(0.0, 0.0, PI - 0.01),
        ]);
        let estimate = cloud.estimate_pose();
        // Naive averaging would give 0; the correct mean sits on the seam.
        assert!(
            estimate.theta.abs() > PI - 0.05,
            "heading should be near ±π, got {}",
            estimate.theta
        );
    }

    #[test]
    fn estimate_is_weighted() {
        let mut cloud = cloud_of(vec![
            Particle {
                w: 3.0,
                ..Particle::new(0.0, 0.0, 0.0)
            },
            Particle {
                w: 1.0,
                ..Particle::new(4.0, 0.0, 0.0)
            },
        ]);
        let estimate = cloud.estimate_pose();
        assert_relative_eq!(estimate.x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn seeded_cloud_centers_on_seed() {
        let mut rng = StdRng::seed_from_u64(7);
        let seed = Pose2D::new(2.0, 3.0, 0.5);
        let init = InitConfig::default();
        let mut cloud = ParticleCloud::from_seed(300, &seed, &init, &mut rng);

        assert_eq!(cloud.len(), 300);
        let estimate = cloud.estimate_pose();
        // Sample-mean deviation is σ/√n; the full 3σ bound is generous.
        assert!((estimate.x - 2.0).abs() < 3.0 * init.spread_xy);
        assert!((estimate.y - 3.0).abs() < 3.0 * init.spread_xy);
        assert!((estimate.theta - 0.5).abs() < 3.0 * init.spread_theta);
    }

    #[test]
    #[should_panic(expected = "empty particle cloud")]
    fn estimate_on_empty_cloud_panics() {
        let mut cloud = ParticleCloud::empty();
        cloud.estimate_pose();
    }
}
