//! Run reporting: artifact persistence, the summary fold, and rendering.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{ErrorCode, HarnessError};
use crate::pipeline::FixtureResult;

const RULE_WIDTH: usize = 60;

/// Create the output directory if needed. Existing contents are kept.
pub fn prepare_output_dir(dir: &Path) -> Result<(), HarnessError> {
    fs::create_dir_all(dir).map_err(|err| HarnessError::ArtifactIo {
        path: dir.to_path_buf(),
        reason: err.to_string(),
    })
}

/// Write the captured diagnostic text to `<dir>/<stem>.output`, replacing any
/// artifact left by a previous run.
pub fn persist_diagnostics(dir: &Path, stem: &str, text: &str) -> Result<PathBuf, HarnessError> {
    let path = dir.join(format!("{stem}.output"));
    fs::write(&path, text).map_err(|err| HarnessError::ArtifactIo {
        path: path.clone(),
        reason: err.to_string(),
    })?;
    Ok(path)
}

/// Aggregate pass/fail tallies for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl RunSummary {
    pub fn from_results(results: &[FixtureResult]) -> Self {
        results.iter().fold(Self::default(), |summary, result| {
            let (passed, failed) = if result.passed() { (1, 0) } else { (0, 1) };
            RunSummary {
                passed: summary.passed + passed,
                failed: summary.failed + failed,
                total: summary.total + 1,
            }
        })
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// 0 when every fixture passed, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.all_passed())
    }
}

/// Human-readable block for one fixture.
pub fn write_fixture<W: Write>(out: &mut W, result: &FixtureResult) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Testing: {}", result.name)?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

    match &result.failure {
        None => writeln!(out, "PASS")?,
        Some(HarnessError::CountMismatch { discrepancies }) => {
            writeln!(out, "FAIL: diagnostic counts differ")?;
            for discrepancy in discrepancies {
                writeln!(out, "  - {discrepancy}")?;
            }
            if let Some(output) = &result.mismatch_output {
                writeln!(out)?;
                writeln!(out, "Actual output:")?;
                writeln!(out, "{output}")?;
            }
        }
        Some(err) => writeln!(out, "FAIL: {}", err.message())?,
    }
    Ok(())
}

pub fn write_banner<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "FIHardeningPass Automated Test Validator")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

pub fn write_summary<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "Test Summary")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "Passed: {}", summary.passed)?;
    writeln!(out, "Failed: {}", summary.failed)?;
    writeln!(out, "Total:  {}", summary.total)
}

/// Machine-readable report consumed by CI.
pub fn summary_json(summary: &RunSummary, results: &[FixtureResult]) -> serde_json::Value {
    serde_json::json!({
        "summary": summary,
        "fixtures": results.iter().map(|result| {
            serde_json::json!({
                "name": result.name,
                "source": result.source,
                "outcome": result.outcome,
                "counts": result.counts,
                "discrepancies": result.discrepancies,
                "failure": result.failure.as_ref().map(|err| serde_json::json!({
                    "kind": err.kind(),
                    "code": err.code(),
                    "message": err.message(),
                })),
                "diagnostics_path": result.diagnostics_path,
            })
        }).collect::<Vec<_>>(),
    })
}
