//! External tool abstractions for the validation pipeline.
//!
//! The compiler and the analysis pass are black boxes. They sit behind the
//! [`Compiler`] and [`Analyzer`] traits so the pipeline can be exercised
//! without a real LLVM toolchain installed.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::diagnostics::DiagnosticText;
use crate::error::HarnessError;

mod clang;
mod opt;
mod process;

pub use clang::ClangCompiler;
pub use opt::OptAnalyzer;
pub use process::{run_bounded, ProcessOutput};

/// Handle to the intermediate form written by a [`Compiler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateArtifact {
    pub path: PathBuf,
}

/// Turns one fixture source into its intermediate form.
///
/// Success is defined by the compiler's exit status alone; the artifact's
/// contents are not inspected.
pub trait Compiler {
    fn compile(&self, source: &Path, output: &Path) -> Result<IntermediateArtifact, HarnessError>;
}

/// Runs the hardening analysis over an intermediate artifact.
///
/// Implementations return the tool's diagnostic stream even when the tool
/// exits unsuccessfully; only launch failures and timeouts are errors.
pub trait Analyzer {
    /// Run-level checks performed once before any fixture is processed.
    fn preflight(&self) -> Result<(), HarnessError> {
        Ok(())
    }

    fn analyze(&self, artifact: &IntermediateArtifact) -> Result<DiagnosticText, HarnessError>;
}

/// Fail with `MissingSource` unless `path` names a readable file.
///
/// Performed locally so that a missing fixture never reaches the compiler.
pub fn ensure_readable_source(path: &Path) -> Result<(), HarnessError> {
    let missing = || HarnessError::MissingSource {
        path: path.to_path_buf(),
    };
    if !path.is_file() {
        return Err(missing());
    }
    File::open(path).map(|_| ()).map_err(|_| missing())
}
