//! Range-sensor model.
//!
//! Re-weights particles by counting, for each hypothesis, how many beam
//! endpoints land close to a mapped obstacle. The raw weight is therefore a
//! vote count of corroborating beams rather than a calibrated likelihood;
//! normalization still yields a valid distribution over the cloud.

use serde::Deserialize;

use crate::core::types::PolarScan;

use super::particle::ParticleCloud;

/// Nearest-obstacle distance queries against the known map.
///
/// Implemented outside this crate (a precomputed distance field over the
/// occupancy map). `None` means the point is unknown or out of map bounds.
pub trait ObstacleField {
    /// Distance in meters from the map-frame point `(x, y)` to the nearest
    /// mapped obstacle, or `None` if unknown.
    fn nearest_obstacle_distance(&self, x: f32, y: f32) -> Option<f32>;
}

/// Configuration for the vote-count sensor model.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SensorModelConfig {
    /// A beam corroborates a hypothesis when its endpoint lies within this
    /// distance of a mapped obstacle, meters.
    pub closeness_threshold: f32,
    /// Raw-weight increment per corroborating beam.
    pub weight_increment: f64,
}

impl Default for SensorModelConfig {
    fn default() -> Self {
        Self {
            closeness_threshold: 0.15,
            weight_increment: 1.0,
        }
    }
}

/// Beam-endpoint vote-count sensor model.
#[derive(Debug, Clone)]
pub struct SensorModel {
    config: SensorModelConfig,
}

impl SensorModel {
    /// Create a new sensor model.
    pub fn new(config: SensorModelConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SensorModelConfig {
        &self.config
    }

    /// Score every particle against the observation, then renormalize.
    ///
    /// Beam endpoints are projected with the particle's pose treated as the
    /// origin of the relative projection: `(r·cos(θ+b), r·sin(θ+b))`.
    /// Beams with no return and endpoints with unknown obstacle distance
    /// contribute nothing.
    pub fn score(&self, cloud: &mut ParticleCloud, scan: &PolarScan, field: &dyn ObstacleField) {
        for p in cloud.iter_mut() {
            for (range, bearing) in scan.iter_valid() {
                let beam_angle = p.theta + bearing;
                let ex = range * beam_angle.cos();
                let ey = range * beam_angle.sin();
                if let Some(dist) = field.nearest_obstacle_distance(ex, ey)
                    && dist < self.config.closeness_threshold
                {
                    p.w += self.config.weight_increment;
                }
            }
        }
        cloud.normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Pose2D;
    use crate::filter::InitConfig;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f32::consts::FRAC_PI_2;

    /// Single point obstacle at a fixed location; everything else far away.
    struct PointObstacle {
        x: f32,
        y: f32,
    }

    impl ObstacleField for PointObstacle {
        fn nearest_obstacle_distance(&self, x: f32, y: f32) -> Option<f32> {
            let dx = x - self.x;
            let dy = y - self.y;
            Some((dx * dx + dy * dy).sqrt())
        }
    }

    /// Map with no information anywhere.
    struct UnknownEverywhere;

    impl ObstacleField for UnknownEverywhere {
        fn nearest_obstacle_distance(&self, _x: f32, _y: f32) -> Option<f32> {
            None
        }
    }

    fn pinned_cloud(n: usize, pose: Pose2D) -> ParticleCloud {
        let mut rng = StdRng::seed_from_u64(9);
        let init = InitConfig {
            spread_xy: 0.0,
            spread_theta: 0.0,
        };
        ParticleCloud::from_seed(n, &pose, &init, &mut rng)
    }

    #[test]
    fn corroborating_beam_increments_weight() {
        let model = SensorModel::new(SensorModelConfig::default());
        let mut cloud = pinned_cloud(4, Pose2D::identity());
        // Beam straight ahead at 2 m; obstacle exactly there.
        let scan = PolarScan::new(vec![2.0], vec![0.0]);
        let field = PointObstacle { x: 2.0, y: 0.0 };

        model.score(&mut cloud, &scan, &field);

        for p in cloud.particles() {
            assert_relative_eq!(p.w, 2.0); // 1.0 initial + 1.0 vote
        }
    }

    #[test]
    fn far_endpoints_leave_weights_unchanged() {
        let model = SensorModel::new(SensorModelConfig::default());
        let mut cloud = pinned_cloud(4, Pose2D::identity());
        let scan = PolarScan::new(vec![2.0, 3.0], vec![0.0, 0.4]);
        // Closest obstacle is >0.15 m from every projected endpoint.
        let field = PointObstacle { x: -5.0, y: -5.0 };

        model.score(&mut cloud, &scan, &field);

        for p in cloud.particles() {
            assert_relative_eq!(p.w, 1.0);
        }
    }

    #[test]
    fn unknown_distances_contribute_nothing() {
        let model = SensorModel::new(SensorModelConfig::default());
        let mut cloud = pinned_cloud(3, Pose2D::identity());
        let scan = PolarScan::new(vec![1.0, 2.0], vec![0.0, 0.1]);

        model.score(&mut cloud, &scan, &UnknownEverywhere);

        for p in cloud.particles() {
            assert_relative_eq!(p.w, 1.0);
        }
    }

    #[test]
    fn infinite_ranges_are_skipped() {
        let model = SensorModel::new(SensorModelConfig::default());
        let mut cloud = pinned_cloud(3, Pose2D::identity());
        // The infinite beam "points at" the obstacle but must be ignored.
        let scan = PolarScan::new(vec![f32::INFINITY], vec![0.0]);
        let field = PointObstacle { x: 2.0, y: 0.0 };

        model.score(&mut cloud, &scan, &field);

        for p in cloud.particles() {
            assert_relative_eq!(p.w, 1.0);
        }
    }

    #[test]
    fn projection_follows_particle_heading() {
        let model = SensorModel::new(SensorModelConfig::default());
        // Particle heading +90°: a zero-bearing beam projects along +y.
        let mut cloud = pinned_cloud(1, Pose2D::new(0.0, 0.0, FRAC_PI_2));
        let scan = PolarScan::new(vec![1.5], vec![0.0]);

        let hit = PointObstacle { x: 0.0, y: 1.5 };
        model.score(&mut cloud, &scan, &hit);
        assert_relative_eq!(cloud.particles()[0].w, 2.0);

        let miss = PointObstacle { x: 1.5, y: 0.0 };
        let mut cloud = pinned_cloud(1, Pose2D::new(0.0, 0.0, FRAC_PI_2));
        model.score(&mut cloud, &scan, &miss);
        assert_relative_eq!(cloud.particles()[0].w, 1.0);
    }

    #[test]
    fn score_normalizes_afterwards() {
        let model = SensorModel::new(SensorModelConfig::default());
        let mut cloud = pinned_cloud(5, Pose2D::identity());
        let scan = PolarScan::new(vec![2.0], vec![0.0]);
        let field = PointObstacle { x: 2.0, y: 0.0 };

        model.score(&mut cloud, &scan, &field);

        let sum: f64 = cloud.particles().iter().map(|p| p.norm_w).sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
    }
}
