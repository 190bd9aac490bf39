//! `diskpulse bench`: positional read benchmark of one device.

use std::path::Path;

use diskpulse_core::report::save_benchmark_json;
use diskpulse_core::{
    BenchmarkConfig, BenchmarkEvent, BenchmarkSummary, ProbeError, format_latency, format_speed,
    spawn_benchmark,
};

pub fn run(
    device: &str,
    block_size: usize,
    samples: usize,
    output_path: Option<&str>,
) -> Result<(), ProbeError> {
    let config = BenchmarkConfig {
        block_size,
        sample_count: samples,
    };
    config.validate()?;

    println!(
        "Benchmarking {device}: {samples} samples of {} bytes (Ctrl+C to stop)\n",
        block_size
    );

    let handle = spawn_benchmark(device, config);

    let cancel = handle.cancel_token();
    if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
        log::warn!("could not install Ctrl+C handler: {e}");
    }

    let mut outcome = None;
    for event in handle.events().iter() {
        match event {
            BenchmarkEvent::Sample { index, observation } => {
                println!(
                    "  [{:>4}/{samples}] {:>6.1}%  {:>12}  seek {:>10}",
                    index + 1,
                    observation.position_percent,
                    format_speed(observation.read_speed_mbps),
                    format_latency(observation.seek_latency_ms)
                );
            }
            BenchmarkEvent::Finished(result) => {
                outcome = Some(result);
                break;
            }
        }
    }
    handle.join();

    let summary = outcome.unwrap_or(Err(ProbeError::Cancelled))?;
    print_summary(&summary);

    if let Some(path) = output_path {
        save_benchmark_json(&summary, Path::new(path))?;
        println!("\nSummary written to {path}");
    }
    Ok(())
}

fn print_summary(summary: &BenchmarkSummary) {
    if summary.sample_count() == 0 {
        println!("No samples taken (empty device or zero sample count).");
        return;
    }
    println!("\n{}", "=".repeat(56));
    println!("{:<12} {:>14} {:>14} {:>14}", "", "Average", "Min", "Max");
    println!("{}", "-".repeat(56));
    println!(
        "{:<12} {:>14} {:>14} {:>14}",
        "Read",
        format_speed(summary.avg_read_speed),
        format_speed(summary.min_read_speed),
        format_speed(summary.max_read_speed)
    );
    println!(
        "{:<12} {:>14} {:>14} {:>14}",
        "Seek",
        format_latency(summary.avg_access_time),
        format_latency(summary.min_access_time),
        format_latency(summary.max_access_time)
    );
}
