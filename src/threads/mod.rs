//! Thread management for the estimator.
//!
//! One dedicated thread runs the full update cycle so a slow update never
//! blocks sensor reception; scans cross into it over a bounded(1) channel
//! whose producer drops on full.

mod localization_thread;

pub use localization_thread::{
    FilterCommand, LocalizationThread, create_command_channel, create_scan_channel,
};
