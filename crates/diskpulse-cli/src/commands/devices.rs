//! `diskpulse devices`: list whole-disk block devices.

use diskpulse_core::{DEFAULT_COMMAND_TIMEOUT, ProbeError, SystemCommandRunner, list_block_devices};

pub fn run(json: bool) -> Result<(), ProbeError> {
    let devices = list_block_devices(&SystemCommandRunner, DEFAULT_COMMAND_TIMEOUT)?;

    if json {
        let text = serde_json::to_string_pretty(&devices)
            .map_err(|e| ProbeError::io("serializing device list", e.into()))?;
        println!("{text}");
        return Ok(());
    }

    println!("Found {} disk(s):\n", devices.len());
    for dev in &devices {
        let model = if dev.model.is_empty() { "-" } else { &dev.model };
        println!("  {:<18} {:>10}  {}", dev.path, dev.size, model);
    }
    if devices.is_empty() {
        println!("  (none found)");
    }
    Ok(())
}
