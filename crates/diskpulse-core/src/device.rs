//! Block device enumeration via `lsblk`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::CommandRunner;
use crate::error::Result;
use crate::smart::scalar_text;

/// One whole-disk block device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device node, e.g. `/dev/sda`.
    pub path: String,
    /// Vendor model string; empty when unknown.
    pub model: String,
    /// Human-readable size as reported by lsblk (`"931.5G"`); empty when unknown.
    pub size: String,
}

/// argv used to enumerate devices.
pub fn lsblk_argv() -> Vec<String> {
    ["lsblk", "-J", "-o", "NAME,MODEL,TYPE,SIZE"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Extract whole disks from `lsblk -J` output. Invalid JSON yields no devices.
pub fn parse_lsblk(json: &str) -> Vec<DeviceInfo> {
    let doc: Value = match serde_json::from_str(json) {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("unparseable lsblk output: {e}");
            return Vec::new();
        }
    };

    let Some(nodes) = doc.get("blockdevices").and_then(Value::as_array) else {
        return Vec::new();
    };

    nodes
        .iter()
        .filter(|node| node.get("type").and_then(Value::as_str) == Some("disk"))
        .filter_map(|node| {
            let name = node.get("name").and_then(Value::as_str)?;
            let field = |key: &str| {
                node.get(key)
                    .map(scalar_text)
                    .unwrap_or_default()
                    .trim()
                    .to_string()
            };
            Some(DeviceInfo {
                path: format!("/dev/{name}"),
                model: field("model"),
                size: field("size"),
            })
        })
        .collect()
}

/// Enumerate disks on this machine.
///
/// A missing `lsblk` or a timeout is an error; a non-zero exit just means
/// nothing could be listed.
pub fn list_block_devices(runner: &dyn CommandRunner, timeout: Duration) -> Result<Vec<DeviceInfo>> {
    let output = runner.execute(&lsblk_argv(), timeout)?;
    if !output.success() {
        log::warn!(
            "lsblk exited with {:?}: {}",
            output.exit_code,
            output.stderr.trim()
        );
        return Ok(Vec::new());
    }
    let devices = parse_lsblk(&output.stdout);
    log::debug!("found {} disk(s)", devices.len());
    Ok(devices)
}
