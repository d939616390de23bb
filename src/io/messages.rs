//! Particle-set publication.
//!
//! The estimator emits one [`ParticleCloudMessage`] per processed cycle
//! through a [`ParticleSink`]; transport (visualization streams, logging,
//! recording) lives outside this crate.

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

use crate::core::types::Quaternion;
use crate::filter::{Particle, ParticleCloud};

/// A renderable 3D pose for external consumers.
///
/// z is fixed at 0 and the orientation is a pure yaw rotation (planar
/// assumption).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoseMessage {
    /// Position (x, y, z) in meters, map frame.
    pub position: [f32; 3],
    /// Orientation quaternion.
    pub orientation: Quaternion,
}

impl From<&Particle> for PoseMessage {
    fn from(p: &Particle) -> Self {
        Self {
            position: [p.x, p.y, 0.0],
            orientation: Quaternion::from_yaw(p.theta),
        }
    }
}

/// One particle as published: pose plus raw weight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParticleState {
    pub pose: PoseMessage,
    pub weight: f64,
}

/// The full particle set at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleCloudMessage {
    /// Timestamp of the scan that produced this cycle, microseconds.
    pub timestamp_us: u64,
    pub particles: Vec<ParticleState>,
}

impl ParticleCloudMessage {
    /// Snapshot a cloud for publication.
    pub fn from_cloud(timestamp_us: u64, cloud: &ParticleCloud) -> Self {
        Self {
            timestamp_us,
            particles: cloud
                .particles()
                .iter()
                .map(|p| ParticleState {
                    pose: PoseMessage::from(p),
                    weight: p.w,
                })
                .collect(),
        }
    }
}

/// Consumer of published particle sets.
pub trait ParticleSink {
    fn publish(&mut self, msg: ParticleCloudMessage);
}

/// Sink that forwards messages over a crossbeam channel.
///
/// Uses `try_send` so a slow or absent consumer can never stall the
/// estimator; messages are dropped on a full channel.
pub struct ChannelSink {
    tx: Sender<ParticleCloudMessage>,
}

impl ChannelSink {
    /// Wrap a channel sender.
    pub fn new(tx: Sender<ParticleCloudMessage>) -> Self {
        Self { tx }
    }
}

impl ParticleSink for ChannelSink {
    fn publish(&mut self, msg: ParticleCloudMessage) {
        if let Err(e) = self.tx.try_send(msg) {
            log::trace!("particle cloud not published: {e}");
        }
    }
}
