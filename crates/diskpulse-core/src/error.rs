//! Error taxonomy shared by the telemetry and benchmark engines.
//!
//! Callers branch on [`ProbeError::kind`] to tell apart the conditions that
//! need different remediation: a missing diagnostic tool, a command that ran
//! past its deadline, a device that refused access, and everything else.
//!
//! A structured document that fails to parse is deliberately absent here.
//! It degrades to "no document" inside the engines and never reaches callers.

use std::path::PathBuf;
use std::time::Duration;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Failure raised by a probe, a command, or an export.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The diagnostic command is not installed or cannot be resolved.
    #[error("{program} not found in PATH")]
    ToolUnavailable { program: String },

    /// The external command did not exit before its deadline and was killed.
    #[error("{program} timed out after {:.1}s", .timeout.as_secs_f64())]
    Timeout { program: String, timeout: Duration },

    /// Opening or reading the device was refused by the OS.
    #[error("permission denied on {} (try running as root)", .path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other device or process I/O failure.
    #[error("I/O error ({context}): {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A caller-supplied parameter was out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The run was stopped through its cancel token.
    #[error("cancelled")]
    Cancelled,

    /// A report could not be serialized or written.
    #[error("failed to export {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Payload-free classification of a [`ProbeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ToolUnavailable,
    Timeout,
    PermissionDenied,
    Io,
    InvalidArgument,
    Cancelled,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToolUnavailable => write!(f, "tool_unavailable"),
            Self::Timeout => write!(f, "timeout"),
            Self::PermissionDenied => write!(f, "permission_denied"),
            Self::Io => write!(f, "io"),
            Self::InvalidArgument => write!(f, "invalid_argument"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl ProbeError {
    /// Classify an I/O error raised while touching `path`.
    ///
    /// `PermissionDenied` is kept distinct; everything else becomes [`ProbeError::Io`].
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied { path, source: err }
        } else {
            Self::Io {
                context: path.display().to_string(),
                source: err,
            }
        }
    }

    /// Wrap a generic I/O error with a short description of what failed.
    pub fn io(context: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source: err,
        }
    }

    /// Which taxonomy bucket this error falls into.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ToolUnavailable { .. } => ErrorKind::ToolUnavailable,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::Io { .. } | Self::Export { .. } => ErrorKind::Io,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}
