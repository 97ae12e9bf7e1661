/*!
 * Net Sentinel CLI
 *
 * Loads configuration, fails fast on anything invalid, then runs the probe
 * loop and the metrics server until SIGINT/SIGTERM.
 */

use clap::Parser;
use net_sentinel::{
    config::{ConfigOverrides, LogLevel, SentinelConfig},
    daemon,
    error::{Result, EXIT_SUCCESS},
    logging, server,
};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Probe an HTTP target on an interval and export Prometheus metrics
#[derive(Parser, Debug)]
#[command(name = "net-sentinel")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE", env = "SENTINEL_CONFIG")]
    config: Option<PathBuf>,

    /// URL to probe [default: https://google.com]
    #[arg(short, long = "target", value_name = "URL", env = "TARGET_URL")]
    target_url: Option<String>,

    /// Time between probes, e.g. 5s, 500ms, 1m [default: 5s]
    #[arg(
        short = 'i',
        long = "interval",
        value_name = "DURATION",
        env = "SENTINEL_CHECK_INTERVAL"
    )]
    check_interval: Option<String>,

    /// Upper bound for one probe [default: 5s]
    #[arg(
        long = "timeout",
        value_name = "DURATION",
        env = "SENTINEL_REQUEST_TIMEOUT"
    )]
    request_timeout: Option<String>,

    /// Address for /metrics, /status and /health [default: 0.0.0.0:2112]
    #[arg(
        short,
        long = "listen",
        value_name = "ADDR",
        env = "SENTINEL_LISTEN_ADDR"
    )]
    listen_addr: Option<String>,

    /// Log level
    #[arg(long, value_enum, env = "SENTINEL_LOG_LEVEL")]
    log_level: Option<LogLevel>,

    /// Write JSON logs to this file instead of stdout
    #[arg(long = "log", value_name = "FILE", env = "SENTINEL_LOG_FILE")]
    log_file: Option<String>,

    /// Verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Values given on the command line or in the environment
    ///
    /// A variable that is set but blank (`TARGET_URL=`) counts as unset.
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            target_url: non_blank(&self.target_url),
            check_interval: non_blank(&self.check_interval),
            request_timeout: non_blank(&self.request_timeout),
            listen_addr: non_blank(&self.listen_addr),
            log_level: self.log_level,
            log_file: non_blank(&self.log_file).map(PathBuf::from),
            verbose: self.verbose,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let base_config = match cli.config {
        Some(ref path) => SentinelConfig::from_file(path)?,
        None => SentinelConfig::default(),
    };
    let config = base_config.merge(cli.overrides());

    // Validate before anything starts
    let resolved = config.resolve()?;

    logging::init_logging(&config)?;

    info!("🚀 Net Sentinel v{} starting", net_sentinel::VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let listener = server::bind(resolved.listen_addr).await?;

        let shutdown = CancellationToken::new();
        tokio::spawn(daemon::watch_signals(shutdown.clone()));

        daemon::run(resolved, listener, shutdown).await
    })?;

    info!("👋 Net Sentinel stopped");
    Ok(())
}
