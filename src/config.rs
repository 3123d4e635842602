//! Harness configuration
//!
//! The harness is meant to run with no arguments: [`HarnessConfig::default`]
//! is the embedded configuration that locates the compiler, the analysis
//! tool, the hardening plugin, and the output directory. A JSON file with the
//! same shape can override any subset of fields for unusual layouts.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete harness configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub toolchain: ToolchainConfig,
    pub paths: PathsConfig,
    pub timeouts: TimeoutConfig,
}

/// External tools used to build and analyse fixtures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Compiler producing textual LLVM IR, resolved through PATH
    pub compiler: String,
    /// Flags placed before `-o <output> <source>`
    pub compiler_args: Vec<String>,
    /// Pass driver that loads the plugin, resolved through PATH
    pub analyzer: String,
    /// Extra leading arguments for the pass driver, before the plugin flags
    pub analyzer_args: Vec<String>,
    /// Location of the hardening pass plugin
    pub plugin_path: PathBuf,
    /// Pipeline name registered by the plugin
    pub pass_name: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: "clang".to_string(),
            compiler_args: vec!["-S".to_string(), "-emit-llvm".to_string()],
            analyzer: "opt".to_string(),
            analyzer_args: Vec::new(),
            plugin_path: PathBuf::from("./build/FIHardeningPass.so"),
            pass_name: "fi-harden".to_string(),
        }
    }
}

/// Filesystem locations for fixture inputs and run outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Base directory fixture source references are resolved against
    pub fixture_root: PathBuf,
    /// Directory receiving `.ll` and `.output` artifacts (reused across runs)
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            fixture_root: PathBuf::from("."),
            output_dir: PathBuf::from("./test_results"),
        }
    }
}

/// Upper bounds on external tool runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub compile_ms: u64,
    pub analyze_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            compile_ms: 60_000,
            analyze_ms: 300_000,
        }
    }
}

impl TimeoutConfig {
    pub fn compile(&self) -> Duration {
        Duration::from_millis(self.compile_ms)
    }

    pub fn analyze(&self) -> Duration {
        Duration::from_millis(self.analyze_ms)
    }
}

impl HarnessConfig {
    /// Load configuration from a JSON file
    ///
    /// Sections or fields omitted from the file keep their defaults. Unlike
    /// the embedded defaults, an explicitly requested file that cannot be
    /// read or parsed is an error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading harness config {}", path.display()))?;
        let config: HarnessConfig = serde_json::from_str(&contents)
            .with_context(|| format!("parsing harness config {}", path.display()))?;
        log::info!("[Config] Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Embedded configuration, or the file at `path` when one is given.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                log::debug!("[Config] Using embedded configuration");
                Ok(Self::default())
            }
        }
    }
}
