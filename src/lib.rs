pub use crate::error::{IdleError, Result};

use once_cell::sync::OnceCell;
use std::sync::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, fmt::Layer, prelude::*, registry::Registry};

pub mod api;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod types;

pub use api::{GroupDirectory, GroupMeClient, MessageArchive};
pub use config::{ClientConfig, ScanConfig};
pub use scanner::{InactivityReport, InactivityScanner, MembershipListing, list_members};

static TRACING_GUARD: OnceCell<Mutex<Option<WorkerGuard>>> = OnceCell::new();

/// Installs the process-wide subscriber used by the command line tool.
///
/// Logs go to stderr so that report output on stdout stays clean. `default_level` applies
/// unless `RUST_LOG` is set. Calling this more than once has no effect.
pub fn init_tracing(default_level: &str) {
    TRACING_GUARD.get_or_init(|| {
        let (non_blocking_stderr, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());

        let stderr_layer = Layer::new()
            .with_writer(non_blocking_stderr)
            .with_ansi(false)
            .with_target(true);

        Registry::default()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
            .with(stderr_layer)
            .init();

        Mutex::new(Some(stderr_guard))
    });
}

/// Flushes buffered log lines. Call before exiting the process.
pub fn flush_tracing() {
    if let Some(guard) = TRACING_GUARD.get() {
        if let Ok(mut guard) = guard.lock() {
            guard.take();
        }
    }
}
