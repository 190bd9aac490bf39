//! One-shot SMART health check.
//!
//! Runs smartctl against a device, prints the synthesized verdict and every
//! attribute with its indicator.
//!
//! Run: `cargo run --example smart_check -- /dev/sda`

use diskpulse_core::{SmartctlConfig, SystemCommandRunner, run_smart_check};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let device = std::env::args().nth(1).unwrap_or_else(|| "/dev/sda".to_string());

    let report = run_smart_check(&SystemCommandRunner, &device, &SmartctlConfig::default())?;
    println!(
        "{}: health={} type={}",
        report.device(),
        report.health(),
        report.family()
    );

    for (attr, indicator) in report.attributes_with_indicators() {
        println!(
            "  [{indicator:>4}] {:<32} {}",
            attr.name,
            diskpulse_core::smart::scalar_text(&attr.value)
        );
    }
    Ok(())
}
