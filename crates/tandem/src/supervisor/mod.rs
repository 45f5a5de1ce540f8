// ABOUTME: Dual-process supervisor: startup sequencing, liveness monitoring, shutdown.
// ABOUTME: Owns both service handles and the shutdown state machine.

mod health;
mod process;
mod signals;

pub use health::wait_ready;
pub use process::ServiceProcess;
pub use signals::shutdown_signal;

use anyhow::{bail, Result};
use tandem_core::Config;
use tokio::time::sleep;

/// Supervisor lifecycle. Transitions are monotonic: Running → Terminating →
/// Stopped, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    Terminating,
    Stopped,
}

/// Owns the backend and frontend handles for its full lifetime. Handles are
/// never shared; cleanup tolerates zero, one, or two populated handles.
pub struct Supervisor {
    config: Config,
    backend: ServiceProcess,
    frontend: ServiceProcess,
    state: ShutdownState,
}

impl Supervisor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            backend: ServiceProcess::new("backend"),
            frontend: ServiceProcess::new("frontend"),
            state: ShutdownState::Running,
        }
    }

    pub fn state(&self) -> ShutdownState {
        self.state
    }

    /// Verify the required service directories before spawning anything.
    pub fn preflight(&self) -> Result<()> {
        for dir in [self.config.backend_dir(), self.config.frontend_dir()] {
            if !dir.is_dir() {
                bail!("Required directory missing: {}", dir.display());
            }
        }
        Ok(())
    }

    /// Startup sequencing followed by the monitor loop. Does not return on
    /// its own once both services are up; the caller cancels this future
    /// when a termination signal arrives and then runs `shutdown`.
    pub async fn run(&mut self) -> Result<()> {
        self.preflight()?;

        let root = self.config.root_expanded();

        tracing::info!("Starting backend");
        self.backend.spawn(&self.config.backend.command, &root)?;

        wait_ready(
            &self.config.health_url,
            self.config.probe_attempts,
            self.config.probe_interval(),
            self.config.probe_timeout(),
        )
        .await?;

        tracing::info!("Starting frontend");
        self.frontend.spawn(&self.config.frontend.command, &root)?;

        tracing::info!("Both services up, monitoring");
        self.monitor().await
    }

    /// Fixed-interval liveness loop. Returns Err as soon as either service
    /// is found dead; there is no automatic restart.
    async fn monitor(&mut self) -> Result<()> {
        loop {
            sleep(self.config.monitor_interval()).await;

            if !self.backend.is_running() {
                bail!("{} exited unexpectedly", self.backend.name());
            }
            if !self.frontend.is_running() {
                bail!("{} exited unexpectedly", self.frontend.name());
            }
        }
    }

    /// Stop both services: graceful terminate, fixed grace period, then
    /// force-kill any survivor. Idempotent.
    pub async fn shutdown(&mut self) {
        if self.state != ShutdownState::Running {
            return;
        }
        self.state = ShutdownState::Terminating;

        if self.backend.is_spawned() || self.frontend.is_spawned() {
            tracing::info!("Stopping services");
            self.backend.terminate();
            self.frontend.terminate();

            sleep(self.config.grace_period()).await;

            self.backend.kill().await;
            self.frontend.kill().await;
        }

        self.state = ShutdownState::Stopped;
        tracing::info!("Supervisor stopped");
    }
}
