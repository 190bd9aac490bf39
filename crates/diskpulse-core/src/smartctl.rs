//! smartctl query: run the diagnostic tool for one device and hand its output
//! to the synthesis engine.

use std::time::Duration;

use serde_json::Value;

use crate::command::CommandRunner;
use crate::error::{ProbeError, Result};
use crate::smart::{self, SmartPayload, TelemetryReport};

/// Deadline for any single external diagnostic command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(15);

/// How smartctl is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartctlConfig {
    /// Program name or path.
    pub program: String,
    pub timeout: Duration,
}

impl Default for SmartctlConfig {
    fn default() -> Self {
        Self {
            program: "smartctl".to_string(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

impl SmartctlConfig {
    /// Full argv for querying `device`: JSON output, health and attributes.
    pub fn argv(&self, device: &str) -> Vec<String> {
        vec![
            self.program.clone(),
            "-j".to_string(),
            "-H".to_string(),
            "-A".to_string(),
            device.to_string(),
        ]
    }
}

/// Run smartctl for `device` and collect its raw output.
///
/// Only a clean exit with parseable stdout yields a document. smartctl sets
/// status bits for failing disks too, so a non-zero exit still returns the
/// transcript for the text fallback.
pub fn query_smart(
    runner: &dyn CommandRunner,
    device: &str,
    config: &SmartctlConfig,
) -> Result<SmartPayload> {
    if !runner.tool_available(&config.program) {
        return Err(ProbeError::ToolUnavailable {
            program: config.program.clone(),
        });
    }

    let output = runner.execute(&config.argv(device), config.timeout)?;

    let document = if output.success() {
        parse_document(device, &output.stdout)
    } else {
        log::warn!(
            "{} exited with {:?} for {device}, falling back to text",
            config.program,
            output.exit_code
        );
        None
    };

    let transcript = (!output.stdout.trim().is_empty()).then_some(output.stdout);
    Ok(SmartPayload::new(document, transcript))
}

/// [`query_smart`] followed by [`smart::synthesize`].
pub fn run_smart_check(
    runner: &dyn CommandRunner,
    device: &str,
    config: &SmartctlConfig,
) -> Result<TelemetryReport> {
    let payload = query_smart(runner, device, config)?;
    Ok(smart::synthesize(device, payload))
}

fn parse_document(device: &str, stdout: &str) -> Option<Value> {
    if stdout.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(stdout) {
        Ok(doc) => Some(doc),
        Err(e) => {
            log::warn!("malformed smartctl JSON for {device}: {e}");
            None
        }
    }
}
