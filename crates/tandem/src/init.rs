// ABOUTME: Bootstrap for tandem configuration.
// ABOUTME: Prompts for root and health URL, writes the config file.

use anyhow::Result;
use std::io::{self, Write};
use tandem_core::Config;

fn prompt(message: &str, default: &str) -> Result<String> {
    print!("{} [{}]: ", message, default);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim();
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input.to_string())
    }
}

pub fn run_init() -> Result<()> {
    println!("tandem initialization\n");

    let defaults = Config::default();
    let root = prompt("Application root", &defaults.root)?;
    let health_url = prompt("Backend health URL", &defaults.health_url)?;

    let config = Config {
        root,
        health_url,
        ..Config::default()
    };

    let config_path = Config::default_path();
    config.save(&config_path)?;
    println!("\nConfig written to {}", config_path.display());

    println!("\nReady to run: tandem run");

    Ok(())
}
