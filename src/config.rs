/*!
 * Configuration types for Net Sentinel
 *
 * Values are layered: built-in defaults, then an optional TOML file, then
 * environment variables and command-line flags (clap resolves those two,
 * flags winning). Nothing is validated until `resolve`, which either yields
 * a usable probe target and listen address or a configuration error.
 */

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sentinel_core::ProbeTarget;

use crate::error::{Result, SentinelError};

/// Main configuration for the monitor
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SentinelConfig {
    /// URL probed on every tick
    #[serde(default = "default_target_url")]
    pub target_url: String,

    /// Time between ticks, e.g. "5s" or "500ms"
    #[serde(default = "default_check_interval")]
    pub check_interval: String,

    /// Upper bound for a single probe, same format as `check_interval`
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,

    /// Address serving /metrics, /status and /health
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stdout)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            check_interval: default_check_interval(),
            request_timeout: default_request_timeout(),
            listen_addr: default_listen_addr(),
            log_level: LogLevel::Info,
            log_file: None,
            verbose: false,
        }
    }
}

/// Values supplied on the command line or through the environment
///
/// Every field is optional; `None` leaves the underlying value alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub target_url: Option<String>,
    pub check_interval: Option<String>,
    pub request_timeout: Option<String>,
    pub listen_addr: Option<String>,
    pub log_level: Option<LogLevel>,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
}

/// Validated runtime settings
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub target: ProbeTarget,
    pub listen_addr: SocketAddr,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

// Default value functions for serde
fn default_target_url() -> String {
    "https://google.com".to_string()
}

fn default_check_interval() -> String {
    "5s".to_string()
}

fn default_request_timeout() -> String {
    "5s".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:2112".to_string()
}

impl SentinelConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SentinelError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
            .map_err(|e| SentinelError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| SentinelError::Config(format!("Invalid configuration: {}", e)))
    }

    /// Layer command-line/environment values on top of this configuration
    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(url) = overrides.target_url {
            self.target_url = url;
        }
        if let Some(interval) = overrides.check_interval {
            self.check_interval = interval;
        }
        if let Some(timeout) = overrides.request_timeout {
            self.request_timeout = timeout;
        }
        if let Some(addr) = overrides.listen_addr {
            self.listen_addr = addr;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if overrides.log_file.is_some() {
            self.log_file = overrides.log_file;
        }
        self.verbose |= overrides.verbose;
        self
    }

    /// Validate every field, failing on the first bad one
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let check_interval = parse_duration(&self.check_interval)
            .map_err(|e| SentinelError::Config(format!("check_interval: {}", e)))?;
        let request_timeout = parse_duration(&self.request_timeout)
            .map_err(|e| SentinelError::Config(format!("request_timeout: {}", e)))?;

        let target = ProbeTarget::new(&self.target_url, check_interval, request_timeout)?;

        let listen_addr = self.listen_addr.parse::<SocketAddr>().map_err(|e| {
            SentinelError::Config(format!("listen_addr '{}': {}", self.listen_addr, e))
        })?;

        Ok(ResolvedConfig {
            target,
            listen_addr,
        })
    }
}

/// Parse a duration such as "250ms", "5s", "2m" or "1h"
///
/// A bare integer is taken as seconds. Zero is accepted here; whether zero
/// is meaningful is up to the caller.
pub fn parse_duration(input: &str) -> std::result::Result<Duration, String> {
    let input = input.trim();

    if input.is_empty() {
        return Err("duration cannot be empty".to_string());
    }

    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);

    if number.is_empty() {
        return Err(format!("'{}' does not start with a number", input));
    }

    let value: u64 = number
        .parse()
        .map_err(|_| format!("'{}' is out of range", input))?;

    let duration = match unit.trim() {
        "ms" => Duration::from_millis(value),
        "" | "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value.saturating_mul(60)),
        "h" => Duration::from_secs(value.saturating_mul(3600)),
        other => return Err(format!("unknown unit '{}' (expected ms, s, m or h)", other)),
    };

    Ok(duration)
}
