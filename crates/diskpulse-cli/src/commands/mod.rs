pub mod bench;
pub mod check;
pub mod devices;

use std::path::{Path, PathBuf};
use std::time::Duration;

use diskpulse_core::{ErrorKind, ProbeError};

/// Install the process logger. `RUST_LOG` wins over `--verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

/// Process exit status for a failed command.
pub fn exit_code(err: &ProbeError) -> i32 {
    match err.kind() {
        ErrorKind::InvalidArgument => 2,
        ErrorKind::ToolUnavailable => 3,
        ErrorKind::Timeout => 4,
        ErrorKind::PermissionDenied => 5,
        ErrorKind::Io => 6,
        ErrorKind::Cancelled => 130,
    }
}

/// Print the error plus whatever the user can do about it.
pub fn report_error(err: &ProbeError) {
    eprintln!("Error: {err}");
    if let Some(hint) = hint_for(err.kind(), running_as_root()) {
        eprintln!("Hint: {hint}");
    }
}

fn hint_for(kind: ErrorKind, is_root: bool) -> Option<&'static str> {
    match kind {
        ErrorKind::ToolUnavailable => {
            Some("install smartmontools (e.g. `apt install smartmontools`) or pass --smartctl PATH")
        }
        ErrorKind::PermissionDenied if !is_root => Some("re-run as root (e.g. with sudo)"),
        ErrorKind::Timeout => Some("raise --timeout-sec if the device is slow to respond"),
        _ => None,
    }
}

#[cfg(unix)]
pub fn running_as_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn running_as_root() -> bool {
    false
}

/// Convert a `--timeout-sec` value, rejecting zero, negative and non-finite input.
pub fn parse_timeout(secs: f64) -> Result<Duration, ProbeError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ProbeError::InvalidArgument(format!(
            "timeout must be a positive number of seconds, got {secs}"
        )));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| {
        ProbeError::InvalidArgument(format!("timeout of {secs} seconds is out of range: {e}"))
    })
}

/// Resolve an export target: an existing directory receives `default_name`.
pub fn export_path(target: &str, default_name: &str) -> PathBuf {
    let path = Path::new(target);
    if path.is_dir() {
        path.join(default_name)
    } else {
        path.to_path_buf()
    }
}
