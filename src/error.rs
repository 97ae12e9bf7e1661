/*!
 * Error types for Net Sentinel
 *
 * Only startup problems are errors. Probe failures never show up here: the
 * prober turns them into DOWN results.
 */

use sentinel_core::TargetError;
use sentinel_observability::MetricsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SentinelError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_RUNTIME: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;

#[derive(Error, Debug)]
pub enum SentinelError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Target URL, interval or timeout rejected
    #[error("Invalid probe target: {0}")]
    Target(#[from] TargetError),

    /// Metric registration or encoding failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP server could not bind or stopped unexpectedly
    #[error("Server error: {0}")]
    Server(String),
}

impl SentinelError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SentinelError::Config(_) | SentinelError::Target(_) => EXIT_CONFIG,
            SentinelError::Metrics(_) | SentinelError::Io(_) | SentinelError::Server(_) => {
                EXIT_RUNTIME
            }
        }
    }
}
