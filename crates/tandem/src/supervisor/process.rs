// ABOUTME: Spawns and tracks one supervised service child process.
// ABOUTME: Forwards child output, checks liveness, and handles termination.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

/// One supervised child process. The handle is owned exclusively by the
/// supervisor and invalidated once termination is confirmed.
pub struct ServiceProcess {
    name: &'static str,
    child: Option<Child>,
    pid: Option<u32>,
}

impl ServiceProcess {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            child: None,
            pid: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Whether a handle is currently populated. Does not check liveness.
    pub fn is_spawned(&self) -> bool {
        self.child.is_some()
    }

    /// Spawn the service from its argv, with `workdir` as working directory.
    /// Stdout and stderr are forwarded line-by-line with a service prefix.
    pub fn spawn(&mut self, command: &[String], workdir: &Path) -> Result<()> {
        let (program, args) = command
            .split_first()
            .with_context(|| format!("Empty command for {}", self.name))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(workdir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn {} ({})", self.name, program))?;

        self.pid = child.id();
        tracing::info!(service = self.name, pid = ?child.id(), "Spawned service");

        // Forward stdout/stderr with a service-name prefix
        let name = self.name;
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(async move {
                let reader = BufReader::new(stdout);
                let mut lines = reader.lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    eprintln!("[{}] {}", name, line);
                }
            });
        }

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let reader = BufReader::new(stderr);
                let mut lines = reader.lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    eprintln!("[{}] {}", name, line);
                }
            });
        }

        self.child = Some(child);
        Ok(())
    }

    /// Liveness check. Reaps and drops the handle if the process has exited.
    pub fn is_running(&mut self) -> bool {
        match &mut self.child {
            Some(child) => match child.try_wait() {
                Ok(None) => true,
                Ok(Some(status)) => {
                    tracing::warn!(service = self.name, %status, "Service exited");
                    self.child = None;
                    self.pid = None;
                    false
                }
                Err(e) => {
                    tracing::warn!(service = self.name, error = %e, "Liveness check failed");
                    self.child = None;
                    self.pid = None;
                    false
                }
            },
            None => false,
        }
    }

    /// Ask the service to exit gracefully (SIGTERM). Failures are ignored,
    /// the process may already be gone.
    #[cfg(unix)]
    pub fn terminate(&self) {
        if let Some(pid) = self.pid {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;
            let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        }
    }

    #[cfg(not(unix))]
    pub fn terminate(&self) {
        if self.pid.is_some() {
            tracing::debug!(service = self.name, "Graceful terminate unsupported, will force kill");
        }
    }

    /// Force-kill any survivor and reap it. Safe when the process already
    /// exited or was never spawned. Invalidates the handle.
    pub async fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            match child.try_wait() {
                Ok(None) => {
                    let _ = child.kill().await;
                }
                _ => {
                    let _ = child.wait().await;
                }
            }
        }
        self.pid = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_empty_command_fails() {
        let mut proc = ServiceProcess::new("backend");
        let result = proc.spawn(&[], Path::new("."));
        assert!(result.is_err());
        assert!(!proc.is_spawned());
    }

    #[tokio::test]
    async fn test_missing_binary_fails() {
        let mut proc = ServiceProcess::new("backend");
        let command = vec!["definitely-not-a-real-binary-4a7f".to_string()];
        let result = proc.spawn(&command, Path::new("."));
        assert!(result.is_err());
        assert!(!proc.is_spawned());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spawn_and_liveness() {
        let mut proc = ServiceProcess::new("backend");
        proc.spawn(&sh("sleep 30"), Path::new(".")).unwrap();
        assert!(proc.is_spawned());
        assert!(proc.pid().is_some());
        assert!(proc.is_running());

        proc.kill().await;
        assert!(!proc.is_spawned());
        assert!(!proc.is_running());
        assert!(proc.pid().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exited_child_detected() {
        let mut proc = ServiceProcess::new("frontend");
        proc.spawn(&sh("exit 0"), Path::new(".")).unwrap();

        // Give the child a moment to exit
        sleep(Duration::from_millis(200)).await;
        assert!(!proc.is_running());
        assert!(!proc.is_spawned());

        // The reaped pid may be recycled by the OS; a later terminate()
        // must not signal it
        assert!(proc.pid().is_none());
        proc.terminate();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_graceful_terminate() {
        let mut proc = ServiceProcess::new("backend");
        proc.spawn(&sh("sleep 30"), Path::new(".")).unwrap();
        assert!(proc.is_running());

        proc.terminate();
        sleep(Duration::from_millis(500)).await;
        assert!(!proc.is_running());
    }

    #[tokio::test]
    async fn test_kill_without_spawn_is_safe() {
        let mut proc = ServiceProcess::new("frontend");
        proc.kill().await;
        proc.kill().await;
        assert!(!proc.is_spawned());
    }
}
