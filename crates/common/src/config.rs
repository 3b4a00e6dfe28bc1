//! Harness configuration
//!
//! Loaded from a TOML file (missing file means defaults), then patched
//! from `WEDTEST_*` environment variables so CI can pick the browser
//! without editing files.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

pub const ENV_BROWSER: &str = "WEDTEST_BROWSER";
pub const ENV_VERSION: &str = "WEDTEST_VERSION";
pub const ENV_PLATFORM: &str = "WEDTEST_PLATFORM";
pub const ENV_TIMEOUT_MS: &str = "WEDTEST_TIMEOUT_MS";
pub const ENV_POLL_INTERVAL_MS: &str = "WEDTEST_POLL_INTERVAL_MS";
pub const ENV_SERVER_URL: &str = "WEDTEST_SERVER_URL";

/// Top-level harness configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Poller timing
    pub poll: PollConfig,

    /// Session under test
    pub environment: EnvironmentConfig,

    /// Test server serving the editor
    pub server: ServerConfig,
}

/// Poller timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Default time budget for a wait
    pub timeout_ms: u64,

    /// Delay between probe evaluations
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout_ms: crate::poll::DEFAULT_TIMEOUT.as_millis() as u64,
            interval_ms: crate::poll::DEFAULT_INTERVAL.as_millis() as u64,
        }
    }
}

impl PollConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Browser, version and platform of the remote session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Engine name, e.g. `CHROME`
    pub browser: String,

    /// Version as reported by the session provider, e.g. `37` or `11.0`
    pub version: String,

    /// Platform as reported by the session provider, e.g. `WINDOWS 7`
    pub platform: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            browser: "CHROME".to_string(),
            version: "37".to_string(),
            platform: "LINUX".to_string(),
        }
    }
}

/// Test server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Root URL of the server hosting the editor build
    pub base_url: String,

    /// Path of the control endpoint, relative to `base_url`
    pub control_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8888".to_string(),
            control_path: "/build/ajax/control".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn control_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.control_path.trim_start_matches('/')
        )
    }
}

impl HarnessConfig {
    /// Load configuration from file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            debug!("Loading configuration from {}", path.display());
            Self::from_toml(&std::fs::read_to_string(path)?)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(browser) = lookup(ENV_BROWSER) {
            self.environment.browser = browser;
        }
        if let Some(version) = lookup(ENV_VERSION) {
            self.environment.version = version;
        }
        if let Some(platform) = lookup(ENV_PLATFORM) {
            self.environment.platform = platform;
        }
        if let Some(url) = lookup(ENV_SERVER_URL) {
            self.server.base_url = url;
        }
        if let Some(ms) = lookup(ENV_TIMEOUT_MS) {
            self.poll.timeout_ms = parse_millis(ENV_TIMEOUT_MS, &ms)?;
        }
        if let Some(ms) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll.interval_ms = parse_millis(ENV_POLL_INTERVAL_MS, &ms)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll.interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "poll.interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.environment.browser.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "environment.browser must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_millis(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("{} must be a whole number of milliseconds, got {:?}", key, value)))
}
