// ABOUTME: Configuration for the tandem supervisor.
// ABOUTME: Loaded from TOML file with sensible defaults.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One supervised service: the directory that must exist before startup
/// and the command used to launch it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Directory under `root` that must exist before startup
    pub dir: String,

    /// Command and arguments, executed with `root` as the working directory
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application root directory containing the service directories
    #[serde(default = "default_root")]
    pub root: String,

    /// Backend readiness endpoint; any non-error HTTP response counts as ready
    #[serde(default = "default_health_url")]
    pub health_url: String,

    /// API server process, spawned first and probed for readiness
    #[serde(default = "default_backend")]
    pub backend: ServiceConfig,

    /// GUI frontend process, spawned once the backend is ready
    #[serde(default = "default_frontend")]
    pub frontend: ServiceConfig,

    /// Seconds between readiness probes
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: f64,

    /// Maximum number of readiness probes before giving up
    #[serde(default = "default_probe_attempts")]
    pub probe_attempts: u32,

    /// Per-probe request timeout in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: f64,

    /// Seconds between liveness checks once both services are up
    #[serde(default = "default_monitor_interval_secs")]
    pub monitor_interval_secs: f64,

    /// Seconds to wait after a graceful terminate before force-killing
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: f64,
}

fn default_root() -> String {
    "/app".to_string()
}

fn default_health_url() -> String {
    "http://127.0.0.1:8000/docs".to_string()
}

fn default_backend() -> ServiceConfig {
    ServiceConfig {
        dir: "backend".to_string(),
        command: [
            "uvicorn",
            "backend.main:app",
            "--host",
            "0.0.0.0",
            "--port",
            "8000",
        ]
        .map(String::from)
        .to_vec(),
    }
}

fn default_frontend() -> ServiceConfig {
    ServiceConfig {
        dir: "frontend".to_string(),
        command: [
            "streamlit",
            "run",
            "frontend/app.py",
            "--server.port",
            "8501",
            "--server.address",
            "0.0.0.0",
        ]
        .map(String::from)
        .to_vec(),
    }
}

fn default_probe_interval_secs() -> f64 {
    1.0
}

fn default_probe_attempts() -> u32 {
    30
}

fn default_probe_timeout_secs() -> f64 {
    2.0
}

fn default_monitor_interval_secs() -> f64 {
    10.0
}

fn default_grace_period_secs() -> f64 {
    2.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: default_root(),
            health_url: default_health_url(),
            backend: default_backend(),
            frontend: default_frontend(),
            probe_interval_secs: default_probe_interval_secs(),
            probe_attempts: default_probe_attempts(),
            probe_timeout_secs: default_probe_timeout_secs(),
            monitor_interval_secs: default_monitor_interval_secs(),
            grace_period_secs: default_grace_period_secs(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// Check the timing knobs; `Duration::from_secs_f64` panics on negative
    /// or non-finite input, so reject those up front.
    pub fn validate(&self) -> Result<()> {
        let knobs = [
            ("probe_interval_secs", self.probe_interval_secs),
            ("probe_timeout_secs", self.probe_timeout_secs),
            ("monitor_interval_secs", self.monitor_interval_secs),
            ("grace_period_secs", self.grace_period_secs),
        ];
        for (name, value) in knobs {
            if !value.is_finite() || value < 0.0 {
                bail!("{name} must be a non-negative number, got {value}");
            }
        }
        Ok(())
    }

    /// Load config from a TOML file, falling back to defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Get the default config file path (~/.config/tandem/tandem.toml)
    pub fn default_path() -> PathBuf {
        std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("."))
            })
            .join("tandem")
            .join("tandem.toml")
    }

    /// Expand ~ in the root path
    pub fn root_expanded(&self) -> PathBuf {
        shellexpand::tilde(&self.root).into_owned().into()
    }

    /// Directory that must exist for the backend service
    pub fn backend_dir(&self) -> PathBuf {
        self.root_expanded().join(&self.backend.dir)
    }

    /// Directory that must exist for the frontend service
    pub fn frontend_dir(&self) -> PathBuf {
        self.root_expanded().join(&self.frontend.dir)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs_f64(self.probe_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.probe_timeout_secs)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs_f64(self.monitor_interval_secs)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs_f64(self.grace_period_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            root = "/srv/app"
            health_url = "http://127.0.0.1:9000/health"

            [backend]
            dir = "api"
            command = ["python", "-m", "api"]

            [frontend]
            dir = "ui"
            command = ["python", "-m", "ui"]
        "#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.root, "/srv/app");
        assert_eq!(config.health_url, "http://127.0.0.1:9000/health");
        assert_eq!(config.backend.dir, "api");
        assert_eq!(config.frontend.command, vec!["python", "-m", "ui"]);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = NamedTempFile::new().unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.root, "/app");
        assert_eq!(config.backend.dir, "backend");
        assert_eq!(config.frontend.dir, "frontend");
        assert_eq!(config.probe_attempts, 30);
        assert_eq!(config.probe_interval_secs, 1.0);
        assert_eq!(config.probe_timeout_secs, 2.0);
        assert_eq!(config.monitor_interval_secs, 10.0);
        assert_eq!(config.grace_period_secs, 2.0);
    }

    #[test]
    fn test_save_and_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tandem.toml");

        let config = Config {
            root: "/opt/app".to_string(),
            health_url: "http://127.0.0.1:8080/docs".to_string(),
            probe_attempts: 5,
            ..Config::default()
        };

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded.root, config.root);
        assert_eq!(loaded.health_url, config.health_url);
        assert_eq!(loaded.probe_attempts, 5);
        assert_eq!(loaded.backend, config.backend);
    }

    #[test]
    fn test_negative_timing_knob_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "probe_interval_secs = -1.0").unwrap();

        let result = Config::load(file.path());
        assert!(result.is_err());
        let msg = format!("{:#}", result.unwrap_err());
        assert!(msg.contains("probe_interval_secs"), "unexpected error: {msg}");
    }

    #[test]
    fn test_non_finite_timing_knob_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "grace_period_secs = nan").unwrap();

        let result = Config::load(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nonexistent.toml");

        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.root, "/app");
    }

    #[test]
    fn test_path_expansion() {
        let config = Config {
            root: "~/app".to_string(),
            ..Config::default()
        };

        let expanded = config.root_expanded();

        // Should not contain ~ after expansion
        assert!(!expanded.to_string_lossy().contains('~'));

        let home = std::env::var("HOME").unwrap();
        assert!(expanded.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn test_service_dirs_under_root() {
        let config = Config::default();
        assert_eq!(config.backend_dir(), PathBuf::from("/app/backend"));
        assert_eq!(config.frontend_dir(), PathBuf::from("/app/frontend"));
    }

    #[test]
    fn test_duration_accessors() {
        let config = Config {
            grace_period_secs: 0.25,
            ..Config::default()
        };
        assert_eq!(config.grace_period(), Duration::from_millis(250));
        assert_eq!(config.probe_interval(), Duration::from_secs(1));
        assert_eq!(config.monitor_interval(), Duration::from_secs(10));
    }
}
