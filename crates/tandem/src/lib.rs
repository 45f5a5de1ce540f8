// ABOUTME: tandem library: supervisor for a backend/frontend process pair.
// ABOUTME: Re-exports for programmatic use of the supervisor.

pub mod init;
pub mod supervisor;

pub use init::run_init;
pub use supervisor::{shutdown_signal, wait_ready, ServiceProcess, ShutdownState, Supervisor};
pub use tandem_core::Config;

use anyhow::Result;
use std::path::PathBuf;

/// Options for running the supervisor
pub struct RunOptions {
    /// Path to configuration file
    pub config_path: Option<PathBuf>,
    /// Override the application root directory
    pub root: Option<PathBuf>,
}

enum Outcome {
    Finished(Result<()>),
    SignalReceived,
}

/// Run the supervisor until a service dies or a termination signal arrives.
/// A requested shutdown returns Ok (exit 0); every failure path returns Err.
pub async fn run(options: RunOptions) -> Result<()> {
    let config_path = options.config_path.unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_default(&config_path)?;
    if let Some(root) = options.root {
        config.root = root.to_string_lossy().into_owned();
    }

    tracing::info!(root = %config.root, health_url = %config.health_url, "Starting supervisor");

    let mut supervisor = Supervisor::new(config);

    // The signal future can preempt the run future at any suspension point,
    // including mid-startup; cleanup then runs to completion.
    let outcome = {
        let run_fut = supervisor.run();
        tokio::pin!(run_fut);
        tokio::select! {
            res = &mut run_fut => Outcome::Finished(res),
            _ = shutdown_signal() => Outcome::SignalReceived,
        }
    };

    match outcome {
        Outcome::SignalReceived => {
            supervisor.shutdown().await;
            Ok(())
        }
        Outcome::Finished(res) => {
            supervisor.shutdown().await;
            res
        }
    }
}
