//! Localization thread - runs the update scheduler off the I/O path.
//!
//! The thread owns the scheduler and all collaborators; the rest of the
//! system talks to it through channels only:
//! - scans arrive on a bounded(1) channel (`try_send` at the producer, so
//!   excess scans are dropped while an update is in flight);
//! - commands (external pose estimates) arrive on an unbounded channel;
//! - particle clouds leave through the configured [`ParticleSink`].
//!
//! A receive timeout doubles as the retry tick for scans whose odometry
//! alignment is not yet available.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded, select, unbounded};

use crate::config::Config;
use crate::core::types::{LaserScan, Pose2D, Timestamped};
use crate::engine::{TransformProvider, UpdateScheduler};
use crate::filter::ObstacleField;
use crate::io::ParticleSink;

/// Commands accepted by the localization thread.
#[derive(Debug, Clone)]
pub enum FilterCommand {
    /// Rebuild the particle cloud around an externally supplied pose.
    SetInitialPose(Pose2D),
}

/// Channel for handing scans to the thread. Bounded to one element: the
/// producer side must use `try_send` and treat a full channel as a dropped
/// scan.
pub fn create_scan_channel() -> (Sender<Timestamped<LaserScan>>, Receiver<Timestamped<LaserScan>>)
{
    bounded(1)
}

/// Command channel for the thread.
pub fn create_command_channel() -> (Sender<FilterCommand>, Receiver<FilterCommand>) {
    unbounded()
}

/// Handle to the running localization thread.
pub struct LocalizationThread {
    handle: JoinHandle<()>,
}

impl LocalizationThread {
    /// Spawn the thread with its collaborators.
    pub fn spawn<F, T, S>(
        config: Config,
        field: F,
        transforms: T,
        sink: S,
        scan_rx: Receiver<Timestamped<LaserScan>>,
        command_rx: Receiver<FilterCommand>,
        running: Arc<AtomicBool>,
    ) -> Self
    where
        F: ObstacleField + Send + 'static,
        T: TransformProvider + Send + 'static,
        S: ParticleSink + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("localization".into())
            .spawn(move || {
                run_loop(config, field, transforms, sink, scan_rx, command_rx, running);
            })
            .expect("failed to spawn localization thread");
        Self { handle }
    }

    /// Wait for the thread to finish.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

fn run_loop<F, T, S>(
    config: Config,
    field: F,
    mut transforms: T,
    mut sink: S,
    scan_rx: Receiver<Timestamped<LaserScan>>,
    command_rx: Receiver<FilterCommand>,
    running: Arc<AtomicBool>,
) where
    F: ObstacleField,
    T: TransformProvider,
    S: ParticleSink,
{
    log::info!(
        "localization thread starting ({} particles)",
        config.filter.num_particles
    );
    let mut scheduler = UpdateScheduler::new(config.filter);
    let tick = Duration::from_millis(config.runtime.cycle_timeout_ms);

    while running.load(Ordering::Relaxed) {
        select! {
            recv(scan_rx) -> msg => match msg {
                Ok(scan) => {
                    scheduler.offer_scan(scan);
                }
                Err(_) => break, // producers gone, shut down
            },
            recv(command_rx) -> msg => match msg {
                Ok(FilterCommand::SetInitialPose(pose)) => {
                    scheduler.set_initial_pose(pose, &mut transforms);
                }
                Err(_) => break,
            },
            default(tick) => {
                // Retry tick for a pending, not-yet-alignable scan.
            }
        }
        scheduler.run_cycle(&mut transforms, &field, &mut sink);
    }

    let stats = scheduler.stats();
    log::info!(
        "localization thread exiting: {} cycles, {} updates, {} skips, {} scans dropped",
        stats.cycles,
        stats.updates,
        stats.skips,
        stats.offers_dropped + stats.scans_dropped,
    );
}
