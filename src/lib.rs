// Fault-injection hardening validator
// Compiles fixed C fixtures, runs the hardening pass over their IR, and checks
// the number of diagnostics reported per category against expectations.

// Module declarations
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fixtures;
pub mod pipeline;
pub mod report;
pub mod toolchain;
pub mod validation;

// Re-exports for convenience
pub use config::HarnessConfig;
pub use diagnostics::{count_markers, DiagnosticCategory, DiagnosticCounts, DiagnosticText};
pub use error::{ErrorCode, HarnessError};
pub use fixtures::{registry, Fixture};
pub use pipeline::{FixtureOutcome, FixtureResult, Harness};
pub use report::RunSummary;
pub use validation::{validate_counts, Discrepancy};

use tracing::Level;

/// Install the stderr log subscriber used by the CLI.
///
/// `log` records from library code are bridged into the subscriber, so the
/// human report on stdout stays free of log lines.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
