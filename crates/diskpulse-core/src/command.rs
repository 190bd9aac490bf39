//! Command execution adapter: run an external diagnostic tool with a hard deadline.
//!
//! The engines only see the narrow [`CommandRunner`] contract. The system
//! implementation spawns the child, drains both pipes on helper threads, and
//! polls `try_wait` until the deadline. A child still running at the deadline
//! is killed and reaped, and the call returns [`ProbeError::Timeout`]. The same
//! deadline bounds collecting its output, which a surviving descendant may
//! keep open after the child itself has exited.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::error::{ProbeError, Result};

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured result of one finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Anything able to run an argv with a timeout.
pub trait CommandRunner: Send + Sync {
    /// Run `argv[0]` with the remaining arguments, killing it after `timeout`.
    fn execute(&self, argv: &[String], timeout: Duration) -> Result<CommandOutput>;

    /// Whether `program` can be resolved before attempting to run it.
    fn tool_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// [`CommandRunner`] backed by `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn execute(&self, argv: &[String], timeout: Duration) -> Result<CommandOutput> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ProbeError::InvalidArgument("empty command line".to_string()))?;

        log::debug!("spawning {:?} (timeout {:.1}s)", argv, timeout.as_secs_f64());

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProbeError::ToolUnavailable {
                        program: program.clone(),
                    }
                } else {
                    ProbeError::io(format!("spawning {program}"), e)
                }
            })?;

        let stdout_reader = spawn_pipe_reader(child.stdout.take());
        let stderr_reader = spawn_pipe_reader(child.stderr.take());

        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        log::warn!(
                            "{program} exceeded {:.1}s, killing pid {}",
                            timeout.as_secs_f64(),
                            child.id()
                        );
                        let _ = child.kill();
                        let _ = child.wait();
                        // Pipe readers are left detached: a grandchild may still
                        // hold the pipes open and joining would block past the deadline.
                        return Err(ProbeError::Timeout {
                            program: program.clone(),
                            timeout,
                        });
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ProbeError::io(format!("waiting for {program}"), e));
                }
            }
        };

        // The child has exited, but a descendant may still hold its pipes.
        let stdout = collect_pipe(&stdout_reader, deadline, program, timeout)?;
        let stderr = collect_pipe(&stderr_reader, deadline, program, timeout)?;

        log::debug!("{program} exited with {:?}", status.code());

        Ok(CommandOutput {
            exit_code: status.code(),
            stdout,
            stderr,
        })
    }
}

type PipeResult = std::io::Result<Vec<u8>>;

fn spawn_pipe_reader<R>(pipe: Option<R>) -> Receiver<PipeResult>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    match pipe {
        Some(mut pipe) => {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let result = pipe.read_to_end(&mut buf).map(|_| buf);
                let _ = tx.send(result);
            });
        }
        None => {
            let _ = tx.send(Ok(Vec::new()));
        }
    }
    rx
}

/// Wait for one pipe's contents, but never past `deadline`.
fn collect_pipe(
    reader: &Receiver<PipeResult>,
    deadline: Instant,
    program: &str,
    timeout: Duration,
) -> Result<String> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    match reader.recv_timeout(remaining) {
        Ok(Ok(bytes)) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Ok(Err(e)) => Err(ProbeError::io(format!("reading output of {program}"), e)),
        Err(RecvTimeoutError::Timeout) => {
            log::warn!(
                "{program} exited but its output stayed open past {:.1}s",
                timeout.as_secs_f64()
            );
            Err(ProbeError::Timeout {
                program: program.to_string(),
                timeout,
            })
        }
        Err(RecvTimeoutError::Disconnected) => Err(ProbeError::io(
            format!("reading output of {program}"),
            std::io::Error::other("pipe reader panicked"),
        )),
    }
}

/// Resolve `program` through `PATH`, or check it directly when it contains a separator.
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}
