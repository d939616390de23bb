//! Publication messages and sinks.

mod messages;

pub use messages::{ChannelSink, ParticleCloudMessage, ParticleSink, ParticleState, PoseMessage};
