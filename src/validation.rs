use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::diagnostics::{DiagnosticCategory, DiagnosticCounts};

/// A single category whose observed count differs from the expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub category: DiagnosticCategory,
    pub expected: u32,
    pub actual: u32,
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.category, self.expected, self.actual
        )
    }
}

/// Compare expected counts against observed counts.
///
/// Keys that do not name a known category are skipped rather than reported;
/// a known category missing from `actual` is treated as zero occurrences.
/// Discrepancies come back in expectation key order.
pub fn validate_counts(
    expected: &BTreeMap<String, u32>,
    actual: &DiagnosticCounts,
) -> Vec<Discrepancy> {
    expected
        .iter()
        .filter_map(|(key, expected)| {
            let category = DiagnosticCategory::from_key(key)?;
            let actual = actual.get(&category).copied().unwrap_or(0);
            (actual != *expected).then_some(Discrepancy {
                category,
                expected: *expected,
                actual,
            })
        })
        .collect()
}
