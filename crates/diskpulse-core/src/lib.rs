//! # diskpulse-core
//!
//! SMART health synthesis and positional read benchmarking for block devices.
//!
//! Two engines make up the crate:
//!
//! - **Telemetry synthesis** ([`smart`]) turns whatever `smartctl` produced for
//!   a device (a JSON document, a text transcript, both, or neither) into one
//!   [`TelemetryReport`] with a disk family, a health verdict, and normalized
//!   attributes. Synthesis is pure and never fails.
//! - **Performance sampling** ([`benchmark`]) reads a fixed-size block at
//!   evenly spaced offsets across a device and reports throughput and seek
//!   latency per position, plus summary statistics.
//!
//! ## Quick Start
//!
//! ```no_run
//! use diskpulse_core::{
//!     BenchmarkConfig, CancelToken, SmartctlConfig, SystemCommandRunner, run_benchmark,
//!     run_smart_check,
//! };
//!
//! let report = run_smart_check(&SystemCommandRunner, "/dev/sda", &SmartctlConfig::default())?;
//! println!("{}: {} ({})", report.device(), report.health(), report.family());
//!
//! let summary = run_benchmark(
//!     "/dev/sda".as_ref(),
//!     &BenchmarkConfig::default(),
//!     &CancelToken::new(),
//!     &mut |i: usize, s: &diskpulse_core::SampleObservation| {
//!         println!("#{i} {:.1}% {:.1} MB/s", s.position_percent, s.read_speed_mbps)
//!     },
//! )?;
//! println!("avg {:.1} MB/s", summary.avg_read_speed);
//! # Ok::<(), diskpulse_core::ProbeError>(())
//! ```
//!
//! ## Architecture
//!
//! Device → `smartctl` ([`command`], [`smartctl`]) → [`smart::synthesize`] → report → export ([`report`])
//!
//! Device → [`benchmark::run_benchmark`] → progress sink / [`BenchmarkSummary`]
//!
//! External commands always run under a deadline. Concurrent probes go through
//! an explicitly owned [`ProbeExecutor`].

pub mod benchmark;
pub mod command;
pub mod device;
pub mod error;
pub mod executor;
pub mod format;
pub mod report;
pub mod smart;
pub mod smartctl;

pub use benchmark::{
    BenchmarkConfig, BenchmarkEvent, BenchmarkHandle, BenchmarkSummary, CancelToken,
    ProgressSink, SampleObservation, aggregate, compute_speed, position_percent, run_benchmark,
    sample_device, spawn_benchmark,
};
pub use command::{CommandOutput, CommandRunner, SystemCommandRunner, find_in_path};
pub use device::{DeviceInfo, list_block_devices, parse_lsblk};
pub use error::{ErrorKind, ProbeError, Result};
pub use executor::{DEFAULT_MAX_WORKERS, JobHandle, ProbeExecutor};
pub use format::{format_latency, format_speed};
pub use smart::{
    Attribute, DiskFamily, HealthIndicator, HealthVerdict, SmartPayload, TelemetryReport,
    attribute_indicator, synthesize,
};
pub use smartctl::{DEFAULT_COMMAND_TIMEOUT, SmartctlConfig, query_smart, run_smart_check};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
