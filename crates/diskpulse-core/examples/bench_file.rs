//! Positional read benchmark against any file or block device.
//!
//! Prints each sample as it is measured, then the summary.
//!
//! Run: `cargo run --example bench_file -- /path/to/image`

use diskpulse_core::{
    BenchmarkConfig, CancelToken, SampleObservation, format_latency, format_speed, run_benchmark,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: bench_file <path>")?;

    let config = BenchmarkConfig {
        block_size: 1024 * 1024,
        sample_count: 20,
    };
    let summary = run_benchmark(
        path.as_ref(),
        &config,
        &CancelToken::new(),
        &mut |i: usize, s: &SampleObservation| {
            println!(
                "#{i:<3} {:>6.1}%  {:>12}  {:>10}",
                s.position_percent,
                format_speed(s.read_speed_mbps),
                format_latency(s.seek_latency_ms)
            );
        },
    )?;

    println!(
        "\nread  avg {} / min {} / max {}",
        format_speed(summary.avg_read_speed),
        format_speed(summary.min_read_speed),
        format_speed(summary.max_read_speed)
    );
    println!(
        "seek  avg {} / min {} / max {}",
        format_latency(summary.avg_access_time),
        format_latency(summary.min_access_time),
        format_latency(summary.max_access_time)
    );
    Ok(())
}
