//! wed acceptance harness core
//!
//! Two pieces the step definitions build on:
//! - [`Poller`]: retry a [`Probe`] against the live session until it is
//!   ready or a deadline passes
//! - [`classify`]: the reference capability flags for a browser, version
//!   and platform, to check the editor's own detection against

pub mod capabilities;
pub mod config;
pub mod error;
pub mod poll;
pub mod probe;
pub mod remote;

pub use capabilities::{
    classify, classify_environment, CapabilityMap, CapabilityTable, Engine, FlagMismatch,
};
pub use config::{EnvironmentConfig, HarnessConfig, PollConfig, ServerConfig};
pub use error::{Error, Result};
pub use poll::{Poller, Timeout};
pub use probe::{changed_from, probe_fn, sample_fn, until, until_count, Probe, Readiness};
pub use remote::{Remote, RemoteError, RemoteStateSource};

/// Harness version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "wedtest.toml";
