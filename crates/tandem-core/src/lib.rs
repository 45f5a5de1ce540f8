// ABOUTME: Shared types and configuration for tandem.
// ABOUTME: Contains config parsing and defaults.

pub mod config;

pub use config::{Config, ServiceConfig};
