//! Update scheduler: the control-flow backbone of the estimator.
//!
//! Owns every piece of mutable filter state explicitly (particle cloud,
//! odometry baseline, pending scan, RNG) and sequences the per-cycle steps:
//!
//! ```text
//! aligned scan → motion update → sensor update (normalizes) → resample
//!              → pose estimate → map→odom correction → publish
//! ```
//!
//! Full updates are gated on accrued motion; sub-threshold cycles skip the
//! heavy steps but still republish the unchanged cloud.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

use crate::core::math::angle_diff;
use crate::core::types::{LaserScan, PolarScan, Pose2D, Timestamped};
use crate::filter::{
    InitConfig, MotionModel, MotionNoiseConfig, ObstacleField, ParticleCloud, ResampleConfig,
    Resampler, SensorModel, SensorModelConfig,
};
use crate::io::{ParticleCloudMessage, ParticleSink};

use super::transforms::{AlignmentError, TransformProvider};

/// Configuration for the estimator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Number of particles in the cloud.
    pub num_particles: usize,

    /// Linear movement on either axis before a full update triggers, meters.
    pub d_thresh: f32,

    /// Angular movement before a full update triggers, radians.
    pub a_thresh: f32,

    /// Random seed for deterministic behavior (0 for OS entropy).
    pub seed: u64,

    /// Motion model noise.
    pub motion: MotionNoiseConfig,

    /// Sensor model configuration.
    pub sensor: SensorModelConfig,

    /// Resampler configuration.
    pub resample: ResampleConfig,

    /// Initial cloud spread.
    pub init: InitConfig,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            num_particles: 300,
            d_thresh: 0.2,
            a_thresh: std::f32::consts::PI / 6.0,
            seed: 0,
            motion: MotionNoiseConfig::default(),
            sensor: SensorModelConfig::default(),
            resample: ResampleConfig::default(),
            init: InitConfig::default(),
        }
    }
}

/// Scheduler lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPhase {
    /// No odometry baseline yet.
    Bootstrap,
    /// Baseline known, particle cloud not built yet.
    UninitializedCloud,
    /// Cloud exists; updates gated by the motion thresholds.
    Tracking,
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulerStats {
    /// Cycles that consumed a scan.
    pub cycles: u64,
    /// Full filter updates.
    pub updates: u64,
    /// Cycles skipped for sub-threshold motion.
    pub skips: u64,
    /// Scans dropped because one was already pending.
    pub offers_dropped: u64,
    /// Scans dropped as permanently unalignable.
    pub scans_dropped: u64,
    /// Cycles deferred waiting for odometry.
    pub alignment_retries: u64,
}

/// What a single cycle did.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleResult {
    /// A scan was consumed this cycle.
    pub processed: bool,
    /// The full update (motion/sensor/resample/estimate) ran.
    pub updated: bool,
    /// Fresh pose estimate, when one was computed.
    pub pose: Option<Pose2D>,
}

/// Motion-gated particle filter scheduler.
pub struct UpdateScheduler {
    config: FilterConfig,
    motion: MotionModel,
    sensor: SensorModel,
    resampler: Resampler,

    phase: FilterPhase,
    cloud: ParticleCloud,
    /// Odometry pose at the last filter update.
    baseline: Option<Pose2D>,
    /// At most one in-flight scan awaiting processing.
    pending: Option<Timestamped<LaserScan>>,
    rng: StdRng,
    stats: SchedulerStats,
}

impl UpdateScheduler {
    /// Create a new scheduler in the bootstrap phase.
    pub fn new(config: FilterConfig) -> Self {
        let rng = if config.seed == 0 {
            StdRng::from_os_rng()
        } else {
            StdRng::seed_from_u64(config.seed)
        };
        Self {
            motion: MotionModel::new(config.motion),
            sensor: SensorModel::new(config.sensor),
            resampler: Resampler::new(config.resample),
            phase: FilterPhase::Bootstrap,
            cloud: ParticleCloud::empty(),
            baseline: None,
            pending: None,
            rng,
            stats: SchedulerStats::default(),
            config,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> FilterPhase {
        self.phase
    }

    /// The particle cloud. Only meaningful between cycles.
    pub fn cloud(&self) -> &ParticleCloud {
        &self.cloud
    }

    /// Odometry baseline of the last update, if any.
    pub fn baseline(&self) -> Option<Pose2D> {
        self.baseline
    }

    /// Diagnostic counters.
    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Hand a new scan to the scheduler.
    ///
    /// Enforces the one-outstanding-observation backpressure: returns false
    /// and drops the scan when one is already pending.
    pub fn offer_scan(&mut self, scan: Timestamped<LaserScan>) -> bool {
        if self.pending.is_some() {
            self.stats.offers_dropped += 1;
            log::trace!(
                "dropping scan at {} us, previous scan still pending",
                scan.timestamp_us
            );
            return false;
        }
        self.pending = Some(scan);
        true
    }

    /// Rebuild the particle cloud around an externally supplied pose
    /// estimate (e.g. an operator picking a location on the map).
    pub fn set_initial_pose(&mut self, pose: Pose2D, transforms: &mut dyn TransformProvider) {
        log::info!(
            "reinitializing particle cloud around ({:.2}, {:.2}, {:.2})",
            pose.x,
            pose.y,
            pose.theta
        );
        self.cloud = ParticleCloud::from_seed(
            self.config.num_particles,
            &pose,
            &self.config.init,
            &mut self.rng,
        );
        let estimate = self.cloud.estimate_pose();
        if let Some(baseline) = self.baseline {
            transforms.apply_map_odom_correction(&estimate, &baseline);
            self.phase = FilterPhase::Tracking;
        }
        // Without a baseline the phase stays at Bootstrap; the first aligned
        // scan records one and tracking starts with this cloud intact.
    }

    /// Process the pending scan, if any.
    ///
    /// A scan that cannot be aligned yet is retried on a later cycle; a scan
    /// older than the available odometry history is dropped for good. The
    /// particle set is published once per processed cycle, whether or not
    /// the full update ran.
    pub fn run_cycle(
        &mut self,
        transforms: &mut dyn TransformProvider,
        field: &dyn ObstacleField,
        sink: &mut dyn ParticleSink,
    ) -> CycleResult {
        let Some(scan) = self.pending.take() else {
            return CycleResult::default();
        };
        let timestamp_us = scan.timestamp_us;

        let odom_pose = match transforms.aligned_pose_at(timestamp_us) {
            Ok(pose) => pose,
            Err(AlignmentError::TooOld) => {
                log::debug!("dropping scan at {timestamp_us} us: predates odometry history");
                self.stats.scans_dropped += 1;
                return CycleResult::default();
            }
            Err(AlignmentError::NotYetAvailable) => {
                // Keep the scan; odometry may catch up by the next cycle.
                self.stats.alignment_retries += 1;
                self.pending = Some(scan);
                return CycleResult::default();
            }
        };

        let observation = transforms.scan_to_polar(&scan.data);
        self.stats.cycles += 1;
        let mut result = CycleResult {
            processed: true,
            ..CycleResult::default()
        };

        match self.phase {
            FilterPhase::Bootstrap => {
                self.baseline = Some(odom_pose);
                // An externally supplied pose may already have built a cloud.
                self.phase = if self.cloud.is_empty() {
                    FilterPhase::UninitializedCloud
                } else {
                    FilterPhase::Tracking
                };
                log::info!(
                    "odometry baseline established at ({:.2}, {:.2}, {:.2})",
                    odom_pose.x,
                    odom_pose.y,
                    odom_pose.theta
                );
            }
            FilterPhase::UninitializedCloud => {
                self.cloud = ParticleCloud::from_seed(
                    self.config.num_particles,
                    &odom_pose,
                    &self.config.init,
                    &mut self.rng,
                );
                let estimate = self.cloud.estimate_pose();
                transforms.apply_map_odom_correction(&estimate, &odom_pose);
                self.phase = FilterPhase::Tracking;
                result.pose = Some(estimate);
                log::info!("particle cloud initialized, {} particles", self.cloud.len());
            }
            FilterPhase::Tracking => {
                let baseline = self
                    .baseline
                    .expect("tracking phase entered without an odometry baseline");
                if self.moved_far_enough(&baseline, &odom_pose) {
                    let estimate =
                        self.full_update(&baseline, &odom_pose, &observation, field);
                    transforms.apply_map_odom_correction(&estimate, &odom_pose);
                    result.updated = true;
                    result.pose = Some(estimate);
                    self.stats.updates += 1;
                } else {
                    self.stats.skips += 1;
                }
            }
        }

        if !self.cloud.is_empty() {
            sink.publish(ParticleCloudMessage::from_cloud(timestamp_us, &self.cloud));
        }
        result
    }

    /// Whether accrued displacement since the baseline justifies an update.
    fn moved_far_enough(&self, baseline: &Pose2D, current: &Pose2D) -> bool {
        (current.x - baseline.x).abs() > self.config.d_thresh
            || (current.y - baseline.y).abs() > self.config.d_thresh
            || angle_diff(baseline.theta, current.theta).abs() > self.config.a_thresh
    }

    /// One complete filter update. Advances the odometry baseline.
    fn full_update(
        &mut self,
        baseline: &Pose2D,
        odom_pose: &Pose2D,
        observation: &PolarScan,
        field: &dyn ObstacleField,
    ) -> Pose2D {
        self.motion
            .apply(&mut self.cloud, baseline, odom_pose, &mut self.rng);
        self.baseline = Some(*odom_pose);
        // Sensor scoring renormalizes the cloud as its final step.
        self.sensor.score(&mut self.cloud, observation, field);
        self.resampler
            .resample(&mut self.cloud, self.config.num_particles, &mut self.rng);
        self.cloud.estimate_pose()
    }
}
