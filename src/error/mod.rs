// Error types for the fault-injection hardening validator
//
// This module defines the harness error taxonomy, providing structured error
// handling with stable numeric codes so CI wrappers can tell failure kinds apart.

mod harness;

pub use harness::{log_harness_error, HarnessError, HarnessErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent reporting in both the
/// human-readable report and the JSON summary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
