//! Two-stage resampling: elitism pruning followed by weighted regeneration
//! with diversity jitter.
//!
//! Pruning concentrates sampling mass on currently-corroborated hypotheses;
//! regenerating with Gaussian jitter around the survivors preserves local
//! search diversity so the cloud does not collapse to a point estimate.

use std::cmp::Ordering;

use rand::Rng;
use serde::Deserialize;

use super::particle::{Particle, ParticleCloud};
use super::sample_gaussian;

/// Configuration for the resampler.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ResampleConfig {
    /// Fraction of the cloud retained as elite survivors, (0, 1].
    pub keep_fraction: f32,
    /// Position jitter around each drawn survivor, meters.
    pub jitter_xy: f32,
    /// Heading jitter around each drawn survivor, radians.
    pub jitter_theta: f32,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            keep_fraction: 0.25,
            jitter_xy: 1.0 / 12.0,
            jitter_theta: std::f32::consts::PI / 24.0,
        }
    }
}

/// Elitism + weighted-regeneration resampler.
#[derive(Debug, Clone)]
pub struct Resampler {
    config: ResampleConfig,
}

impl Resampler {
    /// Create a new resampler.
    pub fn new(config: ResampleConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ResampleConfig {
        &self.config
    }

    /// Replace the cloud with a fresh generation of exactly `target_count`
    /// particles drawn around the highest-weighted survivors.
    ///
    /// Raw weights of the new generation are reset to 1.0; the next sensor
    /// update re-scores them from scratch.
    ///
    /// # Panics
    /// Panics if the cloud is empty: resampling before initialization is a
    /// contract violation.
    pub fn resample<R: Rng>(&self, cloud: &mut ParticleCloud, target_count: usize, rng: &mut R) {
        assert!(
            !cloud.is_empty(),
            "resample requested on an empty particle cloud"
        );

        // Elitism: keep the top keep_fraction by raw weight. The slice is
        // inclusive of the single highest-weighted particle.
        let mut ranked: Vec<Particle> = cloud.particles().to_vec();
        ranked.sort_by(|a, b| a.w.partial_cmp(&b.w).unwrap_or(Ordering::Equal));
        let keep = ((target_count as f32 * self.config.keep_fraction).round() as usize)
            .clamp(1, ranked.len());
        let survivors = ranked.split_off(ranked.len() - keep);

        // Cumulative distribution over the survivors' normalized weights,
        // uniform when every survivor scored zero.
        let total: f64 = survivors.iter().map(|p| p.w).sum();
        let mut cumulative = Vec::with_capacity(keep);
        let mut running = 0.0f64;
        for (i, p) in survivors.iter().enumerate() {
            if total > 0.0 && total.is_finite() {
                running += p.w / total;
            } else {
                running = (i + 1) as f64 / keep as f64;
            }
            cumulative.push(running);
        }

        // Regeneration: draw survivors proportionally and jitter each copy.
        let mut next = Vec::with_capacity(target_count);
        for _ in 0..target_count {
            let u: f64 = rng.random();
            let idx = cumulative.partition_point(|&c| c <= u).min(keep - 1);
            let chosen = &survivors[idx];
            next.push(Particle::new(
                chosen.x + sample_gaussian(rng, self.config.jitter_xy),
                chosen.y + sample_gaussian(rng, self.config.jitter_xy),
                chosen.theta + sample_gaussian(rng, self.config.jitter_theta),
            ));
        }

        cloud.replace(next);
        cloud.normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn cloud_with_weights(weights: &[f64]) -> ParticleCloud {
        let mut cloud = ParticleCloud::empty();
        let particles = weights
            .iter()
            .enumerate()
            .map(|(i, &w)| Particle {
                w,
                ..Particle::new(i as f32, 0.0, 0.0)
            })
            .collect();
        cloud.replace(particles);
        cloud
    }

    #[test]
    fn output_size_is_exact() {
        let resampler = Resampler::new(ResampleConfig::default());
        let mut rng = StdRng::seed_from_u64(11);

        for n in [1, 7, 300] {
            let mut cloud = cloud_with_weights(&vec![1.0; n]);
            resampler.resample(&mut cloud, 300, &mut rng);
            assert_eq!(cloud.len(), 300);
        }
    }

    #[test]
    fn weights_reset_and_renormalized() {
        let resampler = Resampler::new(ResampleConfig::default());
        let mut rng = StdRng::seed_from_u64(12);
        let mut cloud = cloud_with_weights(&[5.0, 1.0, 0.5, 8.0]);

        resampler.resample(&mut cloud, 4, &mut rng);

        for p in cloud.particles() {
            assert_relative_eq!(p.w, 1.0);
            assert_relative_eq!(p.norm_w, 0.25);
        }
    }

    #[test]
    fn resample_keeps_best_particle() {
        // Strictly increasing weights: the elite set must include the last
        // (highest-weighted) particle, so with a dominant top weight every
        // regenerated particle clusters around it.
        let weights: Vec<f64> = (0..20).map(|i| if i == 19 { 1e9 } else { i as f64 }).collect();
        let resampler = Resampler::new(ResampleConfig {
            jitter_xy: 0.0,
            jitter_theta: 0.0,
            ..ResampleConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(13);
        let mut cloud = cloud_with_weights(&weights);

        resampler.resample(&mut cloud, 20, &mut rng);

        // Best particle sat at x = 19.0; essentially all draws should copy it.
        let near_best = cloud
            .particles()
            .iter()
            .filter(|p| (p.x - 19.0).abs() < 1e-6)
            .count();
        assert!(
            near_best >= 19,
            "best survivor should dominate regeneration, got {near_best}/20"
        );
    }

    #[test]
    fn elite_count_rounds_and_never_drops_to_zero() {
        let resampler = Resampler::new(ResampleConfig {
            keep_fraction: 0.25,
            jitter_xy: 0.0,
            jitter_theta: 0.0,
        });
        let mut rng = StdRng::seed_from_u64(14);

        // With 2 particles, round(2 * 0.25) = 1: only the heavier survives.
        let mut cloud = cloud_with_weights(&[1.0, 100.0]);
        resampler.resample(&mut cloud, 2, &mut rng);
        for p in cloud.particles() {
            assert_relative_eq!(p.x, 1.0);
        }
    }

    #[test]
    fn zero_weights_fall_back_to_uniform_draw() {
        let resampler = Resampler::new(ResampleConfig::default());
        let mut rng = StdRng::seed_from_u64(15);
        let mut cloud = cloud_with_weights(&[0.0, 0.0, 0.0, 0.0]);

        resampler.resample(&mut cloud, 100, &mut rng);
        assert_eq!(cloud.len(), 100);
        for p in cloud.particles() {
            assert!(p.x.is_finite() && p.y.is_finite());
        }
    }

    #[test]
    fn jitter_spreads_copies() {
        let resampler = Resampler::new(ResampleConfig::default());
        let mut rng = StdRng::seed_from_u64(16);
        let mut cloud = cloud_with_weights(&[1.0]);

        resampler.resample(&mut cloud, 500, &mut rng);

        let mean_x: f32 =
            cloud.particles().iter().map(|p| p.x).sum::<f32>() / cloud.len() as f32;
        let var_x: f32 = cloud
            .particles()
            .iter()
            .map(|p| (p.x - mean_x) * (p.x - mean_x))
            .sum::<f32>()
            / cloud.len() as f32;
        let sigma = ResampleConfig::default().jitter_xy;

        // Sample variance should be in the neighborhood of σ².
        assert!(
            var_x > 0.25 * sigma * sigma && var_x < 4.0 * sigma * sigma,
            "variance {var_x} should be near {}",
            sigma * sigma
        );
    }

    #[test]
    #[should_panic(expected = "empty particle cloud")]
    fn resample_on_empty_cloud_panics() {
        let resampler = Resampler::new(ResampleConfig::default());
        let mut rng = StdRng::seed_from_u64(17);
        let mut cloud = ParticleCloud::empty();
        resampler.resample(&mut cloud, 10, &mut rng);
    }
}
