//! DhruvaMCL - Monte Carlo localization for differential-drive robots
//!
//! Estimates the robot's planar pose (x, y, heading) from asynchronous,
//! rate-mismatched odometry and laser range streams using a particle filter.
//! Map queries, coordinate transforms, and transport are collaborator traits;
//! this crate owns the estimation logic only.
//!
//! # Architecture
//!
//! The crate is organized into layers, leaves first:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      bin/                           │  ← Executables
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   threads/                          │  ← Estimator thread
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                 engine/  io/  sim/                  │  ← Scheduling, messages,
//! │                                                     │    synthetic collaborators
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    filter/                          │  ← Particle cloud, motion,
//! │                                                     │    sensor, resampling
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                 (types, math)                       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Update cycle
//!
//! Each arriving scan is time-aligned against odometry history, then the
//! scheduler decides whether enough motion has accrued for a full update:
//!
//! ```text
//! scan + aligned pose → motion update → sensor update → normalize
//!                     → resample → pose estimate → publish
//! ```
//!
//! Sub-threshold motion skips the heavy steps but still republishes the
//! (unchanged) particle set, so downstream visualization stays live.

// Layer 1: Core foundation (no internal deps)
pub mod core;

// Layer 2: Particle filter components (depends on core)
pub mod filter;

// Layer 3: Update scheduling and collaborator interfaces
pub mod engine;

// Layer 3: Publication messages and sinks
pub mod io;

// Layer 3: Synthetic world for tests and the demo binary
pub mod sim;

// Layer 4: Estimator thread
pub mod threads;

// Top-level configuration
pub mod config;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use core::math;
pub use core::types::{LaserScan, PolarScan, Pose2D, Quaternion, Timestamped};

// Filter components
pub use filter::{
    InitConfig, MotionModel, MotionNoiseConfig, ObstacleField, Particle, ParticleCloud,
    ResampleConfig, Resampler, SensorModel, SensorModelConfig,
};

// Engine
pub use engine::{
    AlignmentError, CycleResult, FilterConfig, FilterPhase, SchedulerStats, TransformProvider,
    UpdateScheduler,
};

// I/O
pub use io::{ChannelSink, ParticleCloudMessage, ParticleSink, ParticleState, PoseMessage};

// Simulation
pub use sim::{GridWorld, GridWorldConfig, OdometryLog, SharedOdometry};

// Threads
pub use threads::{FilterCommand, LocalizationThread, create_command_channel, create_scan_channel};

// Configuration
pub use config::Config;
