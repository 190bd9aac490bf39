//! Positional read sampling of a block device.
//!
//! The device is divided into `sample_count` evenly spaced offsets. At each
//! offset the engine times the seek, then times one block read, and reports a
//! [`SampleObservation`] to the progress sink before moving on. Samples are
//! always taken and emitted in increasing offset order.
//!
//! Any `Read + Seek` works as a device, which is how regular files stand in
//! for disks in tests.
//!
//! Derived values never divide by zero: a zero/negative elapsed time or an
//! empty read reports 0 MB/s, and a zero-sized device reports position 0%.
//! Positions are not clamped, so an offset at or past the end reads as ≥100%.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{ProbeError, Result};

/// One sequential burst per sample by default.
pub const DEFAULT_BLOCK_SIZE: usize = 4 * 1024 * 1024;
pub const DEFAULT_SAMPLE_COUNT: usize = 100;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

// ---------------------------------------------------------------------------
// Config and results
// ---------------------------------------------------------------------------

/// Parameters of one benchmark run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkConfig {
    /// Bytes read per sample.
    pub block_size: usize,
    /// Number of evenly spaced probes.
    pub sample_count: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            sample_count: DEFAULT_SAMPLE_COUNT,
        }
    }
}

impl BenchmarkConfig {
    /// Reject a zero block size. A zero sample count is valid and yields an empty run.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(ProbeError::InvalidArgument(
                "block size must be at least 1 byte".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleObservation {
    /// Offset as a percentage of device size (not clamped to 100).
    pub position_percent: f64,
    pub read_speed_mbps: f64,
    pub seek_latency_ms: f64,
}

/// Series and summary statistics of a completed run.
///
/// An empty run has empty series and every statistic exactly `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub positions: Vec<f64>,
    pub read_speeds: Vec<f64>,
    pub access_times: Vec<f64>,
    pub avg_read_speed: f64,
    pub min_read_speed: f64,
    pub max_read_speed: f64,
    pub avg_access_time: f64,
    pub min_access_time: f64,
    pub max_access_time: f64,
}

impl BenchmarkSummary {
    /// The defined zero value: no samples, all statistics `0.0`.
    pub fn empty() -> Self {
        Self {
            positions: Vec::new(),
            read_speeds: Vec::new(),
            access_times: Vec::new(),
            avg_read_speed: 0.0,
            min_read_speed: 0.0,
            max_read_speed: 0.0,
            avg_access_time: 0.0,
            min_access_time: 0.0,
            max_access_time: 0.0,
        }
    }

    /// Number of probes in the run.
    pub fn sample_count(&self) -> usize {
        self.read_speeds.len()
    }
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Throughput in MiB/s. Zero when nothing was read or no time elapsed.
pub fn compute_speed(bytes_read: usize, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 || bytes_read == 0 {
        return 0.0;
    }
    (bytes_read as f64 / BYTES_PER_MIB) / elapsed_secs
}

/// `position / total_size * 100`, or `0.0` for a zero-sized device.
pub fn position_percent(position: u64, total_size: u64) -> f64 {
    if total_size == 0 {
        return 0.0;
    }
    position as f64 / total_size as f64 * 100.0
}

/// Target offset of probe `index` out of `sample_count`.
pub fn sample_offset(index: usize, total_size: u64, sample_count: usize) -> u64 {
    if sample_count == 0 {
        return 0;
    }
    // u128 keeps index * total_size from overflowing on multi-terabyte devices.
    ((index as u128 * total_size as u128) / sample_count as u128) as u64
}

/// Build the summary from the three series.
///
/// When `read_speeds` is empty the run produced nothing and the zero value is
/// returned. Otherwise each statistic is computed over its own series, so the
/// series need not have equal lengths.
pub fn aggregate(
    read_speeds: Vec<f64>,
    access_times: Vec<f64>,
    positions: Vec<f64>,
) -> BenchmarkSummary {
    if read_speeds.is_empty() {
        return BenchmarkSummary::empty();
    }
    let (avg_read_speed, min_read_speed, max_read_speed) = series_stats(&read_speeds);
    let (avg_access_time, min_access_time, max_access_time) = series_stats(&access_times);

    BenchmarkSummary {
        positions,
        read_speeds,
        access_times,
        avg_read_speed,
        min_read_speed,
        max_read_speed,
        avg_access_time,
        min_access_time,
        max_access_time,
    }
}

/// (mean, min, max) of a series; all zero when empty.
fn series_stats(values: &[f64]) -> (f64, f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let sum: f64 = values.iter().sum();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (sum / values.len() as f64, min, max)
}

// ---------------------------------------------------------------------------
// Progress and cancellation
// ---------------------------------------------------------------------------

/// Receives each observation as soon as it is measured.
pub trait ProgressSink {
    fn on_sample(&mut self, index: usize, observation: &SampleObservation);
}

impl<F> ProgressSink for F
where
    F: FnMut(usize, &SampleObservation),
{
    fn on_sample(&mut self, index: usize, observation: &SampleObservation) {
        self(index, observation)
    }
}

/// Cooperative stop flag, checked before each probe.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Open `path` read-only and sample it.
///
/// A refused open is [`ProbeError::PermissionDenied`]; other failures are
/// [`ProbeError::Io`]. No summary is produced for a failed or cancelled run.
pub fn run_benchmark(
    path: &Path,
    config: &BenchmarkConfig,
    cancel: &CancelToken,
    sink: &mut dyn ProgressSink,
) -> Result<BenchmarkSummary> {
    config.validate()?;
    let mut device = File::open(path).map_err(|e| ProbeError::from_io(path, e))?;
    sample_device(&mut device, path, config, cancel, sink)
}

/// Sample an already opened device. `label` only names it in errors and logs.
pub fn sample_device<D>(
    device: &mut D,
    label: &Path,
    config: &BenchmarkConfig,
    cancel: &CancelToken,
    sink: &mut dyn ProgressSink,
) -> Result<BenchmarkSummary>
where
    D: Read + Seek + ?Sized,
{
    config.validate()?;
    let io_err = |e: io::Error| ProbeError::from_io(label, e);

    let total_size = device.seek(SeekFrom::End(0)).map_err(io_err)?;
    device.seek(SeekFrom::Start(0)).map_err(io_err)?;

    log::info!(
        "benchmarking {} ({} bytes, {} samples of {} bytes)",
        label.display(),
        total_size,
        config.sample_count,
        config.block_size
    );

    if total_size == 0 || config.sample_count == 0 {
        log::warn!("{}: nothing to sample", label.display());
        return Ok(BenchmarkSummary::empty());
    }

    let n = config.sample_count;
    let mut read_speeds = Vec::with_capacity(n);
    let mut access_times = Vec::with_capacity(n);
    let mut positions = Vec::with_capacity(n);
    // Never allocate more than the device can return in one read.
    let buf_len =
        usize::try_from(total_size).map_or(config.block_size, |t| config.block_size.min(t));
    let mut buf = vec![0u8; buf_len];

    for index in 0..n {
        if cancel.is_cancelled() {
            log::info!("{}: cancelled after {index} samples", label.display());
            return Err(ProbeError::Cancelled);
        }

        let offset = sample_offset(index, total_size, n);

        let t0 = Instant::now();
        device.seek(SeekFrom::Start(offset)).map_err(io_err)?;
        let seek_latency_ms = t0.elapsed().as_secs_f64() * 1000.0;

        let t1 = Instant::now();
        let bytes_read = read_block(device, &mut buf).map_err(io_err)?;
        let elapsed = t1.elapsed().as_secs_f64();

        let observation = SampleObservation {
            position_percent: position_percent(offset, total_size),
            read_speed_mbps: compute_speed(bytes_read, elapsed),
            seek_latency_ms,
        };
        log::debug!(
            "sample {index}: offset={offset} bytes={bytes_read} {:.1} MB/s {:.3} ms",
            observation.read_speed_mbps,
            observation.seek_latency_ms
        );

        read_speeds.push(observation.read_speed_mbps);
        access_times.push(observation.seek_latency_ms);
        positions.push(observation.position_percent);
        sink.on_sample(index, &observation);
    }

    Ok(aggregate(read_speeds, access_times, positions))
}

/// Fill `buf` unless the device ends first. Returns bytes read.
fn read_block<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// ---------------------------------------------------------------------------
// Background runs
// ---------------------------------------------------------------------------

/// Event published by a background benchmark.
///
/// Zero or more `Sample` events are followed by exactly one `Finished`.
#[derive(Debug)]
pub enum BenchmarkEvent {
    Sample {
        index: usize,
        observation: SampleObservation,
    },
    Finished(Result<BenchmarkSummary>),
}

/// Handle to a benchmark running on its own thread.
pub struct BenchmarkHandle {
    events: Receiver<BenchmarkEvent>,
    cancel: CancelToken,
    thread: JoinHandle<()>,
}

impl BenchmarkHandle {
    /// Event stream; ends after the `Finished` event.
    pub fn events(&self) -> &Receiver<BenchmarkEvent> {
        &self.events
    }

    /// Token that stops the run before its next probe.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for the worker thread to exit.
    pub fn join(self) {
        let _ = self.thread.join();
    }
}

struct ChannelSink {
    tx: Sender<BenchmarkEvent>,
    cancel: CancelToken,
}

impl ProgressSink for ChannelSink {
    fn on_sample(&mut self, index: usize, observation: &SampleObservation) {
        let sent = self.tx.send(BenchmarkEvent::Sample {
            index,
            observation: *observation,
        });
        if sent.is_err() {
            // Nobody is listening any more; stop reading the device.
            self.cancel.cancel();
        }
    }
}

/// Run `job` and publish its outcome as the single `Finished` event.
///
/// A panic inside the run is reported as an I/O error instead of leaving the
/// stream without a terminal event.
fn finish_with<F>(tx: &Sender<BenchmarkEvent>, job: F)
where
    F: FnOnce() -> Result<BenchmarkSummary>,
{
    let result = std::panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|_| {
        Err(ProbeError::io(
            "benchmark worker",
            io::Error::other("benchmark worker panicked"),
        ))
    });
    let _ = tx.send(BenchmarkEvent::Finished(result));
}

/// Run [`run_benchmark`] on a dedicated thread, publishing events over a channel.
pub fn spawn_benchmark(path: impl Into<PathBuf>, config: BenchmarkConfig) -> BenchmarkHandle {
    let path = path.into();
    let cancel = CancelToken::new();
    let (tx, rx) = mpsc::channel();

    let worker_cancel = cancel.clone();
    let thread = std::thread::spawn(move || {
        let mut sink = ChannelSink {
            tx: tx.clone(),
            cancel: worker_cancel.clone(),
        };
        finish_with(&tx, || run_benchmark(&path, &config, &worker_cancel, &mut sink));
    });

    BenchmarkHandle {
        events: rx,
        cancel,
        thread,
    }
}
