//! Diagnostic categories reported by the fault-injection hardening pass and
//! the counter that tallies them from captured stderr.
//!
//! The pass emits free-form text. Each category is recognised by a fixed,
//! case-sensitive marker substring; counting is plain occurrence counting so
//! a single line mentioning two markers contributes to both categories.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Captured diagnostic stream from one analysis run.
pub type DiagnosticText = String;

/// Per-category occurrence counts produced by [`count_markers`].
pub type DiagnosticCounts = BTreeMap<DiagnosticCategory, u32>;

/// Closed set of findings the analysis pass can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    ConditionalBranch,
    Load,
    Store,
    VulnerableInstruction,
}

impl DiagnosticCategory {
    pub const ALL: [DiagnosticCategory; 4] = [
        DiagnosticCategory::ConditionalBranch,
        DiagnosticCategory::Load,
        DiagnosticCategory::Store,
        DiagnosticCategory::VulnerableInstruction,
    ];

    /// Literal substring identifying this category in the pass output.
    pub fn marker(&self) -> &'static str {
        match self {
            DiagnosticCategory::ConditionalBranch => "Conditional branch",
            DiagnosticCategory::Load => "Load instruction",
            DiagnosticCategory::Store => "Store instruction",
            DiagnosticCategory::VulnerableInstruction => "potentially vulnerable instruction",
        }
    }

    /// Key used in fixture expectations.
    pub fn key(&self) -> &'static str {
        match self {
            DiagnosticCategory::ConditionalBranch => "conditional_branch",
            DiagnosticCategory::Load => "load",
            DiagnosticCategory::Store => "store",
            DiagnosticCategory::VulnerableInstruction => "vulnerable_instruction",
        }
    }

    /// Resolve an expectation key. Unknown keys yield `None` and are skipped
    /// by both the counter and the validator.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.key() == key)
    }

    /// Number of non-overlapping occurrences of this category's marker.
    pub fn occurrences(&self, text: &str) -> u32 {
        text.matches(self.marker()).count() as u32
    }
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Count marker occurrences for every requested key that names a known
/// category. Unknown keys are absent from the result.
pub fn count_markers<'a, I>(text: &str, requested: I) -> DiagnosticCounts
where
    I: IntoIterator<Item = &'a str>,
{
    requested
        .into_iter()
        .filter_map(DiagnosticCategory::from_key)
        .map(|category| (category, category.occurrences(text)))
        .collect()
}
