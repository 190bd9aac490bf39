//! Report persistence: JSON and CSV export of [`TelemetryReport`]s, JSON of
//! [`BenchmarkSummary`]s.
//!
//! The JSON layout is the report's serde form and loads back losslessly. The
//! CSV layout is a three-column header block, a blank row, then one attribute
//! table whose columns depend on the disk family.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::benchmark::BenchmarkSummary;
use crate::error::{ProbeError, Result};
use crate::smart::{DiskFamily, TelemetryReport, scalar_text};

const NVME_HEADER: [&str; 4] = ["Name", "Value", "Raw", "Indicator"];
const ATA_HEADER: [&str; 7] = ["ID", "Name", "Value", "Worst", "Thresh", "Raw", "Indicator"];

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Pretty-printed JSON of a report.
pub fn to_json(report: &TelemetryReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(|e| ProbeError::io("serializing report", e.into()))
}

pub fn save_json(report: &TelemetryReport, path: &Path) -> Result<()> {
    let json = to_json(report)?;
    fs::write(path, json).map_err(|source| export_error(path, source))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Read back a report written by [`save_json`].
pub fn load_json(path: &Path) -> Result<TelemetryReport> {
    let text = fs::read_to_string(path).map_err(|e| ProbeError::from_io(path, e))?;
    serde_json::from_str(&text).map_err(|e| {
        ProbeError::io(
            format!("parsing {}", path.display()),
            io::Error::new(io::ErrorKind::InvalidData, e),
        )
    })
}

pub fn save_benchmark_json(summary: &BenchmarkSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| ProbeError::io("serializing benchmark summary", e.into()))?;
    fs::write(path, json).map_err(|source| export_error(path, source))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Write the CSV layout of `report` to any writer.
pub fn write_csv<W: Write>(report: &TelemetryReport, mut out: W) -> io::Result<()> {
    write_row(&mut out, &["Device", "Health", "Type"])?;
    write_row(
        &mut out,
        &[
            report.device(),
            &report.health().to_string(),
            &report.family().to_string(),
        ],
    )?;
    writeln!(out)?;

    match report.family() {
        DiskFamily::Nvme => {
            write_row(&mut out, &NVME_HEADER)?;
            for (attr, indicator) in report.attributes_with_indicators() {
                write_row(
                    &mut out,
                    &[
                        &attr.name,
                        &scalar_text(&attr.value),
                        &scalar_text(&attr.raw),
                        &indicator.to_string(),
                    ],
                )?;
            }
        }
        DiskFamily::SataAta | DiskFamily::Unknown => {
            write_row(&mut out, &ATA_HEADER)?;
            for (attr, indicator) in report.attributes_with_indicators() {
                write_row(
                    &mut out,
                    &[
                        &scalar_text(&attr.id),
                        &attr.name,
                        &scalar_text(&attr.value),
                        &scalar_text(&attr.worst),
                        &scalar_text(&attr.threshold),
                        &scalar_text(&attr.raw),
                        &indicator.to_string(),
                    ],
                )?;
            }
        }
    }
    out.flush()
}

pub fn save_csv(report: &TelemetryReport, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| export_error(path, source))?;
    write_csv(report, BufWriter::new(file)).map_err(|source| export_error(path, source))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn write_row<W: Write>(out: &mut W, fields: &[&str]) -> io::Result<()> {
    let line = fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(out, "{line}")
}

/// Quote a field when it contains a separator, quote or line break.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// ---------------------------------------------------------------------------
// File names
// ---------------------------------------------------------------------------

/// `smart_report_<device>.json` with the device made filesystem-safe.
pub fn default_json_filename(device: &str) -> String {
    format!("smart_report_{}.json", sanitize_device(device))
}

/// `smart_report_<device>.csv` with the device made filesystem-safe.
pub fn default_csv_filename(device: &str) -> String {
    format!("smart_report_{}.csv", sanitize_device(device))
}

fn sanitize_device(device: &str) -> String {
    device
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn export_error(path: &Path, source: io::Error) -> ProbeError {
    ProbeError::Export {
        path: path.to_path_buf(),
        source,
    }
}
