// Harness error types and constants

use crate::error::ErrorCode;
use crate::validation::Discrepancy;
use log::error;
use std::fmt;
use std::path::PathBuf;

/// Harness error code constants
///
/// Error code range: 2001-2007
pub struct HarnessErrorCodes {}

impl HarnessErrorCodes {
    /// The analysis plugin artifact is missing; the run cannot start
    pub const FATAL_PRECONDITION: i32 = 2001;

    /// Fixture source does not resolve to a readable file
    pub const MISSING_SOURCE: i32 = 2002;

    /// External compiler reported a non-success exit
    pub const COMPILE_FAILED: i32 = 2003;

    /// Diagnostic counts differ from the fixture's expectations
    pub const COUNT_MISMATCH: i32 = 2004;

    /// External tool exceeded its time budget and was killed
    pub const TOOL_TIMEOUT: i32 = 2005;

    /// External tool binary could not be spawned
    pub const TOOL_LAUNCH: i32 = 2006;

    /// Output directory or artifact could not be written
    pub const ARTIFACT_IO: i32 = 2007;
}

/// Log a harness error with structured context
///
/// Fields logged:
/// - error_code: Numeric error code for programmatic handling
/// - context: Where the error surfaced (fixture name or run phase)
/// - message: Human-readable error message
pub fn log_harness_error(err: &HarnessError, context: &str) {
    error!(
        "Harness error in {}: code={}, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while validating the analysis tool against its fixtures.
///
/// Only `FatalPrecondition` (and an output directory that cannot be created)
/// aborts a run; every other variant is recorded against a single fixture.
#[derive(Debug, Clone, PartialEq)]
pub enum HarnessError {
    /// Analysis plugin not found at its configured location
    FatalPrecondition { path: PathBuf },

    /// Fixture source file missing or unreadable
    MissingSource { path: PathBuf },

    /// Compiler exited unsuccessfully
    CompileFailed { status: Option<i32>, stderr: String },

    /// One or more categories did not match the expected count
    CountMismatch { discrepancies: Vec<Discrepancy> },

    /// External process ran past its deadline
    ToolTimeout { program: String, timeout_ms: u64 },

    /// External process could not be started
    ToolLaunch { program: String, reason: String },

    /// Filesystem write failed for an output artifact
    ArtifactIo { path: PathBuf, reason: String },
}

impl HarnessError {
    /// True for errors that abort the whole run rather than one fixture.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HarnessError::FatalPrecondition { .. })
    }

    /// Short stable identifier used in JSON summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            HarnessError::FatalPrecondition { .. } => "fatal_precondition",
            HarnessError::MissingSource { .. } => "missing_source",
            HarnessError::CompileFailed { .. } => "compile_failed",
            HarnessError::CountMismatch { .. } => "count_mismatch",
            HarnessError::ToolTimeout { .. } => "tool_timeout",
            HarnessError::ToolLaunch { .. } => "tool_launch",
            HarnessError::ArtifactIo { .. } => "artifact_io",
        }
    }
}

impl ErrorCode for HarnessError {
    fn code(&self) -> i32 {
        match self {
            HarnessError::FatalPrecondition { .. } => HarnessErrorCodes::FATAL_PRECONDITION,
            HarnessError::MissingSource { .. } => HarnessErrorCodes::MISSING_SOURCE,
            HarnessError::CompileFailed { .. } => HarnessErrorCodes::COMPILE_FAILED,
            HarnessError::CountMismatch { .. } => HarnessErrorCodes::COUNT_MISMATCH,
            HarnessError::ToolTimeout { .. } => HarnessErrorCodes::TOOL_TIMEOUT,
            HarnessError::ToolLaunch { .. } => HarnessErrorCodes::TOOL_LAUNCH,
            HarnessError::ArtifactIo { .. } => HarnessErrorCodes::ARTIFACT_IO,
        }
    }

    fn message(&self) -> String {
        match self {
            HarnessError::FatalPrecondition { path } => {
                format!(
                    "Plugin not found at {}. Please build the plugin first.",
                    path.display()
                )
            }
            HarnessError::MissingSource { path } => {
                format!("Source file not found: {}", path.display())
            }
            HarnessError::CompileFailed { status, stderr } => {
                let status = status
                    .map(|code| code.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                if stderr.trim().is_empty() {
                    format!("Compilation failed (exit {})", status)
                } else {
                    format!("Compilation failed (exit {}): {}", status, stderr.trim())
                }
            }
            HarnessError::CountMismatch { discrepancies } => {
                let details = discrepancies
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("Diagnostic counts mismatched: {}", details)
            }
            HarnessError::ToolTimeout {
                program,
                timeout_ms,
            } => {
                format!("{} did not finish within {} ms", program, timeout_ms)
            }
            HarnessError::ToolLaunch { program, reason } => {
                format!("Failed to launch {}: {}", program, reason)
            }
            HarnessError::ArtifactIo { path, reason } => {
                format!("Failed to write {}: {}", path.display(), reason)
            }
        }
    }
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HarnessError::{} (code {}): {}",
            self.variant_name(),
            self.code(),
            self.message()
        )
    }
}

impl HarnessError {
    fn variant_name(&self) -> &'static str {
        match self {
            HarnessError::FatalPrecondition { .. } => "FatalPrecondition",
            HarnessError::MissingSource { .. } => "MissingSource",
            HarnessError::CompileFailed { .. } => "CompileFailed",
            HarnessError::CountMismatch { .. } => "CountMismatch",
            HarnessError::ToolTimeout { .. } => "ToolTimeout",
            HarnessError::ToolLaunch { .. } => "ToolLaunch",
            HarnessError::ArtifactIo { .. } => "ArtifactIo",
        }
    }
}

impl std::error::Error for HarnessError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCategory;

    #[test]
    fn test_harness_error_codes() {
        assert_eq!(
            HarnessError::FatalPrecondition {
                path: PathBuf::from("plugin.so")
            }
            .code(),
            HarnessErrorCodes::FATAL_PRECONDITION
        );
        assert_eq!(
            HarnessError::MissingSource {
                path: PathBuf::from("a.c")
            }
            .code(),
            HarnessErrorCodes::MISSING_SOURCE
        );
        assert_eq!(
            HarnessError::CompileFailed {
                status: Some(1),
                stderr: String::new()
            }
            .code(),
            HarnessErrorCodes::COMPILE_FAILED
        );
        assert_eq!(
            HarnessError::CountMismatch {
                discrepancies: Vec::new()
            }
            .code(),
            HarnessErrorCodes::COUNT_MISMATCH
        );
        assert_eq!(
            HarnessError::ToolTimeout {
                program: "opt".to_string(),
                timeout_ms: 10
            }
            .code(),
            HarnessErrorCodes::TOOL_TIMEOUT
        );
        assert_eq!(
            HarnessError::ToolLaunch {
                program: "clang".to_string(),
                reason: "not found".to_string()
            }
            .code(),
            HarnessErrorCodes::TOOL_LAUNCH
        );
        assert_eq!(
            HarnessError::ArtifactIo {
                path: PathBuf::from("out"),
                reason: "denied".to_string()
            }
            .code(),
            HarnessErrorCodes::ARTIFACT_IO
        );
    }

    #[test]
    fn test_harness_error_messages() {
        let err = HarnessError::MissingSource {
            path: PathBuf::from("tests/test_vulnerable.c"),
        };
        assert_eq!(
            err.message(),
            "Source file not found: tests/test_vulnerable.c"
        );

        let err = HarnessError::CompileFailed {
            status: Some(1),
            stderr: "  error: expected ';'\n".to_string(),
        };
        assert_eq!(
            err.message(),
            "Compilation failed (exit 1): error: expected ';'"
        );

        let err = HarnessError::CountMismatch {
            discrepancies: vec![Discrepancy {
                category: DiagnosticCategory::ConditionalBranch,
                expected: 0,
                actual: 1,
            }],
        };
        assert!(err.message().contains("conditional_branch: expected 0, got 1"));
    }

    #[test]
    fn test_harness_error_display() {
        let err = HarnessError::ToolTimeout {
            program: "opt".to_string(),
            timeout_ms: 250,
        };
        let display = format!("{}", err);
        assert!(display.starts_with("HarnessError::ToolTimeout"));
        assert!(display.contains(&err.code().to_string()));
    }

    #[test]
    fn only_missing_plugin_is_fatal() {
        assert!(HarnessError::FatalPrecondition {
            path: PathBuf::from("x")
        }
        .is_fatal());
        assert!(!HarnessError::MissingSource {
            path: PathBuf::from("x")
        }
        .is_fatal());
    }
}
