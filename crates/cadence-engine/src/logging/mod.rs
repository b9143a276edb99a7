//! Logging utilities.
//!
//! The library only speaks through the `log` facade. Binaries call [`init_logging`] early in
//! `main` to install `env_logger`.
//!
//! Targets worth filtering on:
//! - `cadence_engine::scheduler`: engine registration, frame loop start/stop, hook failures
//! - `cadence_engine::input`: pointer state transitions, gesture creation and eviction

mod init;

pub use init::{init_logging, LoggingConfig, LOG_ENV};
