//! # Runtime Telemetry
//!
//! Structured logging for processes that host component containers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use runtime_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // Container builds, stage transitions and graph warnings are now logged
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RUNTIME_SERVICE_NAME` | `component-runtime` | Service name |
//! | `RUNTIME_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `RUNTIME_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `RUNTIME_JSON_LOGS` | `false` | JSON lines instead of pretty output |

mod config;
mod logging;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};

use std::sync::Once;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Install the global `tracing` subscriber.
///
/// Fails if the filter does not parse or a subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    logging::init_logging(config)?;

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "Telemetry initialized"
    );
    Ok(())
}

static TEST_INIT: Once = Once::new();

/// Install a quiet subscriber once per process; later calls do nothing.
///
/// For test binaries, where every test may try to initialize.
pub fn init_for_tests() {
    TEST_INIT.call_once(|| {
        let config = TelemetryConfig::for_tests();
        if let Err(e) = logging::init_logging(&config) {
            eprintln!("Telemetry not installed: {e}");
        }
    });
}
