// ABOUTME: tandem CLI entry point.
// ABOUTME: Provides init and run subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tandem::{run, run_init, RunOptions};

#[derive(Parser)]
#[command(name = "tandem")]
#[command(about = "Supervisor for a backend/frontend service pair")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new tandem configuration
    Init,
    /// Run the supervisor
    Run {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the application root directory
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    tandem_log::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => run_init(),
        Commands::Run { config, root } => {
            run(RunOptions {
                config_path: config,
                root,
            })
            .await
        }
    }
}
