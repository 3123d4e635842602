//! Fixture registry for the hardening pass validator.
//!
//! Each fixture pairs a C source file with the number of diagnostics the
//! hardening pass is expected to report for it. The list is fixed at build
//! time and always enumerated in declaration order, which is also the order
//! results are reported in.
//!
//! Counts include compiler-generated loads/stores (stack spills for locals),
//! so they track `clang -S -emit-llvm` at its default optimisation level.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::Serialize;

/// One named source input with its expected per-category diagnostic counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fixture {
    pub name: String,
    pub source: PathBuf,
    pub expected_counts: BTreeMap<String, u32>,
}

impl Fixture {
    pub fn new(name: &str, source: &str, expected: &[(&str, u32)]) -> Self {
        Self {
            name: name.to_string(),
            source: PathBuf::from(source),
            expected_counts: expected
                .iter()
                .map(|(key, count)| (key.to_string(), *count))
                .collect(),
        }
    }

    /// Source location resolved against the configured fixture root.
    pub fn source_path(&self, fixture_root: &Path) -> PathBuf {
        fixture_root.join(&self.source)
    }

    /// File stem shared by the `.ll` and `.output` artifacts.
    pub fn artifact_stem(&self) -> String {
        self.source
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| self.name.replace(char::is_whitespace, "_"))
    }
}

static REGISTRY: Lazy<Vec<Fixture>> = Lazy::new(|| {
    vec![
        Fixture::new(
            "Vulnerable Function",
            "fixtures/test_vulnerable.c",
            &[("conditional_branch", 1), ("vulnerable_instruction", 1)],
        ),
        // Equality check guards the branch; loads/stores remain unverified.
        Fixture::new(
            "Safe with Equality",
            "fixtures/test_safe_equality.c",
            &[("conditional_branch", 0), ("vulnerable_instruction", 1)],
        ),
        Fixture::new(
            "Safe with Verification",
            "fixtures/test_safe_verification.c",
            &[("vulnerable_instruction", 0)],
        ),
        Fixture::new(
            "Clean Function",
            "fixtures/test_clean.c",
            &[("vulnerable_instruction", 1)],
        ),
    ]
});

/// Ordered list of fixtures every run processes.
pub fn registry() -> &'static [Fixture] {
    &REGISTRY
}
