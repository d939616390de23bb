//! Particle filter components: the cloud itself plus the three
//! transformations applied to it each update cycle (motion propagation,
//! sensor scoring, resampling).

mod motion;
mod particle;
mod resample;
mod sensor;

pub use motion::{MotionModel, MotionNoiseConfig};
pub use particle::{InitConfig, Particle, ParticleCloud};
pub use resample::{ResampleConfig, Resampler};
pub use sensor::{ObstacleField, SensorModel, SensorModelConfig};

use rand::Rng;
use rand_distr::StandardNormal;

/// Zero-mean Gaussian draw with the given standard deviation.
#[inline]
pub(crate) fn sample_gaussian<R: Rng>(rng: &mut R, sigma: f32) -> f32 {
    let n: f32 = rng.sample(StandardNormal);
    n * sigma
}
