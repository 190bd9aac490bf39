//! `diskpulse check`: SMART health report for one disk or all of them.

use std::fmt::Write as _;
use std::path::Path;

use diskpulse_core::report::{default_csv_filename, default_json_filename, save_csv, save_json};
use diskpulse_core::smart::scalar_text;
use diskpulse_core::{
    DiskFamily, HealthIndicator, ProbeError, ProbeExecutor, SmartctlConfig, SystemCommandRunner,
    TelemetryReport, list_block_devices, run_smart_check,
};

use super::{export_path, parse_timeout};

pub struct CheckCommandConfig<'a> {
    pub device: Option<&'a str>,
    pub all: bool,
    pub json_path: Option<&'a str>,
    pub csv_path: Option<&'a str>,
    pub show_raw: bool,
    pub timeout_sec: f64,
    pub smartctl: &'a str,
    pub workers: usize,
}

pub fn run(cfg: CheckCommandConfig<'_>) -> Result<(), ProbeError> {
    let smartctl = SmartctlConfig {
        program: cfg.smartctl.to_string(),
        timeout: parse_timeout(cfg.timeout_sec)?,
    };

    if cfg.all {
        return run_all(&cfg, &smartctl);
    }

    let device = cfg
        .device
        .ok_or_else(|| ProbeError::InvalidArgument("a device or --all is required".to_string()))?;
    let report = run_smart_check(&SystemCommandRunner, device, &smartctl)?;
    print!("{}", render_report(&report, cfg.show_raw));
    export(&report, &cfg)
}

fn run_all(cfg: &CheckCommandConfig<'_>, smartctl: &SmartctlConfig) -> Result<(), ProbeError> {
    for target in [cfg.json_path, cfg.csv_path].into_iter().flatten() {
        if !Path::new(target).is_dir() {
            return Err(ProbeError::InvalidArgument(format!(
                "with --all, export targets must be existing directories: {target}"
            )));
        }
    }

    let devices = list_block_devices(&SystemCommandRunner, smartctl.timeout)?;
    if devices.is_empty() {
        println!("No disks found.");
        return Ok(());
    }
    println!(
        "Checking {} disk(s) with up to {} concurrent probes...\n",
        devices.len(),
        cfg.workers.max(1)
    );

    let pool = ProbeExecutor::new(cfg.workers)?;
    let handles: Vec<_> = devices
        .iter()
        .map(|dev| {
            let path = dev.path.clone();
            let smartctl = smartctl.clone();
            pool.submit(move || run_smart_check(&SystemCommandRunner, &path, &smartctl))
        })
        .collect();

    let mut first_error = None;
    for (dev, handle) in devices.iter().zip(handles) {
        match handle.wait().and_then(|r| r) {
            Ok(report) => {
                print!("{}", render_report(&report, cfg.show_raw));
                println!();
                if let Err(e) = export(&report, cfg) {
                    eprintln!("  {}: {e}", dev.path);
                    first_error.get_or_insert(e);
                }
            }
            Err(e) => {
                eprintln!("{}: {e}\n", dev.path);
                first_error.get_or_insert(e);
            }
        }
    }
    pool.shutdown();

    first_error.map_or(Ok(()), Err)
}

fn export(report: &TelemetryReport, cfg: &CheckCommandConfig<'_>) -> Result<(), ProbeError> {
    if let Some(target) = cfg.json_path {
        let path = export_path(target, &default_json_filename(report.device()));
        save_json(report, &path)?;
        println!("JSON report written to {}", path.display());
    }
    if let Some(target) = cfg.csv_path {
        let path = export_path(target, &default_csv_filename(report.device()));
        save_csv(report, &path)?;
        println!("CSV report written to {}", path.display());
    }
    Ok(())
}

/// Human-readable report: verdict header, then the family's attribute table.
pub fn render_report(report: &TelemetryReport, show_raw: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Device: {}", report.device());
    let _ = writeln!(out, "Type:   {}", family_label(report.family()));
    let _ = writeln!(out, "Health: {}", report.health());

    let warnings = report
        .attributes_with_indicators()
        .filter(|(_, ind)| *ind == HealthIndicator::Warning)
        .count();

    if report.attributes().is_empty() {
        let _ = writeln!(out, "\n  (no attributes)");
    } else {
        let _ = writeln!(out);
        match report.family() {
            DiskFamily::Nvme => {
                let _ = writeln!(out, "  {:<40} {:>16} {:>5}", "Name", "Value", "");
                let _ = writeln!(out, "  {}", "-".repeat(63));
                for (attr, ind) in report.attributes_with_indicators() {
                    let _ = writeln!(
                        out,
                        "  {:<40} {:>16} {:>5}",
                        attr.name,
                        scalar_text(&attr.value),
                        ind.to_string()
                    );
                }
            }
            DiskFamily::SataAta | DiskFamily::Unknown => {
                let _ = writeln!(
                    out,
                    "  {:>3} {:<28} {:>5} {:>5} {:>6} {:>16} {:>5}",
                    "ID", "Name", "Value", "Worst", "Thresh", "Raw", ""
                );
                let _ = writeln!(out, "  {}", "-".repeat(74));
                for (attr, ind) in report.attributes_with_indicators() {
                    let _ = writeln!(
                        out,
                        "  {:>3} {:<28} {:>5} {:>5} {:>6} {:>16} {:>5}",
                        scalar_text(&attr.id),
                        attr.name,
                        scalar_text(&attr.value),
                        scalar_text(&attr.worst),
                        scalar_text(&attr.threshold),
                        scalar_text(&attr.raw),
                        ind.to_string()
                    );
                }
            }
        }
        let _ = writeln!(
            out,
            "\n  {} attribute(s), {} flagged",
            report.attributes().len(),
            warnings
        );
    }

    if show_raw {
        if let Some(transcript) = report.transcript() {
            let _ = writeln!(out, "\nRaw smartctl output:\n{transcript}");
        }
    }
    out
}

fn family_label(family: DiskFamily) -> &'static str {
    match family {
        DiskFamily::Nvme => "NVMe",
        DiskFamily::SataAta => "SATA/ATA",
        DiskFamily::Unknown => "unknown",
    }
}
