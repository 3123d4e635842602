//! Per-fixture validation pipeline.
//!
//! A run checks the analysis plugin once, prepares the output directory,
//! then takes every fixture through source lookup, compilation, analysis,
//! counting and validation. Per-fixture errors become a failed
//! [`FixtureResult`] and the run moves on; only run-level preconditions
//! abort.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::PathsConfig;
use crate::diagnostics::{count_markers, DiagnosticCounts, DiagnosticText};
use crate::error::{log_harness_error, HarnessError};
use crate::fixtures::Fixture;
use crate::report;
use crate::toolchain::{ensure_readable_source, Analyzer, Compiler};
use crate::validation::{validate_counts, Discrepancy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureOutcome {
    Pass,
    Fail,
}

/// Everything learned about one fixture during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureResult {
    pub name: String,
    pub source: PathBuf,
    pub outcome: FixtureOutcome,
    /// Empty unless analysis ran and counts disagreed.
    pub discrepancies: Vec<Discrepancy>,
    /// Counts for the known categories the fixture asked about.
    pub counts: DiagnosticCounts,
    /// Why the fixture failed; `None` exactly when it passed.
    pub failure: Option<HarnessError>,
    /// Captured pass output, kept only for count mismatches so it can be shown.
    pub mismatch_output: Option<DiagnosticText>,
    pub diagnostics_path: Option<PathBuf>,
}

impl FixtureResult {
    pub fn passed(&self) -> bool {
        self.outcome == FixtureOutcome::Pass
    }

    fn from_evaluation(fixture: &Fixture, evaluation: Result<Evaluation, HarnessError>) -> Self {
        let mut result = FixtureResult {
            name: fixture.name.clone(),
            source: fixture.source.clone(),
            outcome: FixtureOutcome::Fail,
            discrepancies: Vec::new(),
            counts: DiagnosticCounts::new(),
            failure: None,
            mismatch_output: None,
            diagnostics_path: None,
        };

        match evaluation {
            Ok(evaluation) if evaluation.discrepancies.is_empty() => {
                result.outcome = FixtureOutcome::Pass;
                result.counts = evaluation.counts;
                result.diagnostics_path = Some(evaluation.diagnostics_path);
            }
            Ok(evaluation) => {
                result.failure = Some(HarnessError::CountMismatch {
                    discrepancies: evaluation.discrepancies.clone(),
                });
                result.discrepancies = evaluation.discrepancies;
                result.counts = evaluation.counts;
                result.mismatch_output = Some(evaluation.text);
                result.diagnostics_path = Some(evaluation.diagnostics_path);
            }
            Err(err) => result.failure = Some(err),
        }
        result
    }
}

struct Evaluation {
    text: DiagnosticText,
    counts: DiagnosticCounts,
    discrepancies: Vec<Discrepancy>,
    diagnostics_path: PathBuf,
}

/// Drives fixtures through a compiler and an analyzer.
pub struct Harness<C, A> {
    paths: PathsConfig,
    compiler: C,
    analyzer: A,
}

impl<C: Compiler, A: Analyzer> Harness<C, A> {
    pub fn new(paths: PathsConfig, compiler: C, analyzer: A) -> Self {
        Self {
            paths,
            compiler,
            analyzer,
        }
    }

    /// Process `fixtures` in order.
    ///
    /// Returns `Err` only for run-level failures (missing plugin, output
    /// directory that cannot be created); in that case no fixture is touched.
    /// Otherwise the result has exactly one entry per fixture.
    pub fn run(&self, fixtures: &[Fixture]) -> Result<Vec<FixtureResult>, HarnessError> {
        if let Err(err) = self.analyzer.preflight() {
            log_harness_error(&err, "preflight");
            return Err(err);
        }
        if let Err(err) = report::prepare_output_dir(&self.paths.output_dir) {
            log_harness_error(&err, "output directory");
            return Err(err);
        }

        log::info!(
            "validating {} fixtures into {}",
            fixtures.len(),
            self.paths.output_dir.display()
        );
        Ok(fixtures
            .iter()
            .map(|fixture| self.process(fixture))
            .collect())
    }

    /// Run a single fixture; never fails, failures are part of the result.
    pub fn process(&self, fixture: &Fixture) -> FixtureResult {
        let span = tracing::info_span!("fixture", name = %fixture.name);
        let _guard = span.enter();

        let result = FixtureResult::from_evaluation(fixture, self.evaluate(fixture));
        match &result.failure {
            Some(err) => log_harness_error(err, &fixture.name),
            None => log::info!("{} passed", fixture.name),
        }
        result
    }

    fn evaluate(&self, fixture: &Fixture) -> Result<Evaluation, HarnessError> {
        let source = fixture.source_path(&self.paths.fixture_root);
        ensure_readable_source(&source)?;

        let stem = fixture.artifact_stem();
        let ir_path = self.paths.output_dir.join(format!("{stem}.ll"));
        let artifact = self.compiler.compile(&source, &ir_path)?;
        let text = self.analyzer.analyze(&artifact)?;
        let diagnostics_path = report::persist_diagnostics(&self.paths.output_dir, &stem, &text)?;

        let counts = count_markers(&text, fixture.expected_counts.keys().map(String::as_str));
        let discrepancies = validate_counts(&fixture.expected_counts, &counts);
        log::debug!("{} counts: {:?}", fixture.name, counts);

        Ok(Evaluation {
            text,
            counts,
            discrepancies,
            diagnostics_path,
        })
    }
}
