//! Process runner for the pymobiledevice3 command-line tool.
//!
//! All device communication goes through [`CommandRunner`] so the client
//! logic can be exercised without a device attached.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use expo_dev_mcp_core::{DeviceSettings, Error, Result};

/// Grace period for a terminated log stream to exit.
const REAP_TIMEOUT: Duration = Duration::from_secs(2);

/// Executes backend commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Name used in log messages.
    fn name(&self) -> &'static str;

    /// Run a command to completion and return its stdout.
    ///
    /// A non-zero exit status maps to [`Error::CommandFailed`] carrying
    /// stderr (or stdout when stderr is empty).
    async fn run(&self, args: &[String], timeout: Duration) -> Result<String>;

    /// Run a streaming command for `duration` and collect its stdout lines.
    ///
    /// The process is terminated once the duration elapses.
    async fn capture_lines(&self, args: &[String], duration: Duration) -> Result<Vec<String>>;
}

/// Runs `python3 -m pymobiledevice3 ...` (or the configured equivalent).
#[derive(Debug, Clone)]
pub struct Pymobiledevice3 {
    settings: DeviceSettings,
}

impl Pymobiledevice3 {
    /// Create a runner from device settings.
    pub fn new(settings: DeviceSettings) -> Self {
        Self { settings }
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.settings.program);
        cmd.args(&self.settings.module_args)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    fn spawn_error(&self, err: std::io::Error) -> Error {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::BackendNotFound(self.settings.program.clone())
        } else {
            Error::Io(err)
        }
    }
}

/// Map a failed exit to the most specific error.
fn failure(stdout: &str, stderr: &str) -> Error {
    let message = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };
    if message.contains("No module named pymobiledevice3") {
        return Error::BackendNotFound("pymobiledevice3".to_string());
    }
    Error::CommandFailed(message.to_string())
}

#[async_trait]
impl CommandRunner for Pymobiledevice3 {
    fn name(&self) -> &'static str {
        "pymobiledevice3"
    }

    async fn run(&self, args: &[String], timeout: Duration) -> Result<String> {
        debug!("Running pymobiledevice3 {}", args.join(" "));

        let child = self
            .command(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    "pymobiledevice3 {} timed out after {:?}",
                    args.join(" "),
                    timeout
                );
                return Err(Error::CommandTimeout(timeout.as_secs()));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            Ok(stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("Command exited with {}: {}", output.status, stderr.trim());
            Err(failure(&stdout, &stderr))
        }
    }

    async fn capture_lines(&self, args: &[String], duration: Duration) -> Result<Vec<String>> {
        debug!(
            "Streaming pymobiledevice3 {} for {:?}",
            args.join(" "),
            duration
        );

        let mut child = self
            .command(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Other("child stdout was not captured".to_string()))?;
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf).await;
                buf
            })
        });

        let mut reader = BufReader::new(stdout);
        let mut lines = Vec::new();
        let mut buf = Vec::new();
        let mut stream_ended = false;

        let deadline = tokio::time::sleep(duration);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => break,
                read = reader.read_until(b'\n', &mut buf) => match read {
                    Ok(0) => {
                        stream_ended = true;
                        break;
                    }
                    Ok(_) => {
                        lines.push(String::from_utf8_lossy(&buf).trim_end().to_string());
                        buf.clear();
                    }
                    Err(e) => {
                        warn!("Error reading log stream: {}", e);
                        stream_ended = true;
                        break;
                    }
                }
            }
        }

        if let Err(e) = child.start_kill() {
            debug!("Log stream already exited: {}", e);
        }
        let status = tokio::time::timeout(REAP_TIMEOUT, child.wait()).await;

        if stream_ended && lines.is_empty() {
            if let Ok(Ok(status)) = status {
                if !status.success() {
                    let stderr = match stderr_task {
                        Some(task) => task.await.unwrap_or_default(),
                        None => String::new(),
                    };
                    return Err(failure("", &stderr));
                }
            }
        }

        Ok(lines)
    }
}
