use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use crate::config::{TimeoutConfig, ToolchainConfig};
use crate::diagnostics::DiagnosticText;
use crate::error::HarnessError;
use crate::toolchain::{run_bounded, Analyzer, IntermediateArtifact};

/// Loads the hardening plugin into `opt` and runs its pass read-only.
#[derive(Debug, Clone)]
pub struct OptAnalyzer {
    program: String,
    args: Vec<String>,
    plugin_path: PathBuf,
    pass_name: String,
    timeout: Duration,
}

impl OptAnalyzer {
    pub fn new(
        program: impl Into<String>,
        plugin_path: impl Into<PathBuf>,
        pass_name: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            plugin_path: plugin_path.into(),
            pass_name: pass_name.into(),
            timeout,
        }
    }

    pub fn from_config(toolchain: &ToolchainConfig, timeouts: &TimeoutConfig) -> Self {
        Self::new(
            toolchain.analyzer.clone(),
            toolchain.plugin_path.clone(),
            toolchain.pass_name.clone(),
            timeouts.analyze(),
        )
        .with_args(toolchain.analyzer_args.clone())
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    fn command(&self, artifact: &IntermediateArtifact) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(format!("-load-pass-plugin={}", self.plugin_path.display()))
            .arg(format!("-passes={}", self.pass_name))
            // The pass only reports; never write a rewritten module.
            .arg("-disable-output")
            .arg(&artifact.path);
        command
    }
}

impl Analyzer for OptAnalyzer {
    fn preflight(&self) -> Result<(), HarnessError> {
        if self.plugin_path.exists() {
            Ok(())
        } else {
            Err(HarnessError::FatalPrecondition {
                path: self.plugin_path.clone(),
            })
        }
    }

    fn analyze(&self, artifact: &IntermediateArtifact) -> Result<DiagnosticText, HarnessError> {
        let output = run_bounded(self.command(artifact), self.timeout)?;
        if !output.status.success() {
            log::warn!(
                "{} exited with {:?} on {}; using captured diagnostics",
                self.program,
                output.status.code(),
                artifact.path.display()
            );
        }
        Ok(output.stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> IntermediateArtifact {
        IntermediateArtifact {
            path: PathBuf::from("test_results/test_clean.ll"),
        }
    }

    #[test]
    fn command_enables_pass_and_disables_output() {
        let analyzer = OptAnalyzer::from_config(
            &ToolchainConfig::default(),
            &TimeoutConfig::default(),
        );
        let command = analyzer.command(&artifact());
        let args: Vec<_> = command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(command.get_program(), "opt");
        assert_eq!(
            args,
            vec![
                "-load-pass-plugin=./build/FIHardeningPass.so",
                "-passes=fi-harden",
                "-disable-output",
                "test_results/test_clean.ll",
            ]
        );
    }

    #[test]
    fn preflight_requires_plugin() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = dir.path().join("FIHardeningPass.so");
        let analyzer = OptAnalyzer::new("opt", &plugin, "fi-harden", Duration::from_secs(1));
        assert_eq!(
            analyzer.preflight(),
            Err(HarnessError::FatalPrecondition {
                path: plugin.clone()
            })
        );

        std::fs::write(&plugin, b"").unwrap();
        assert!(analyzer.preflight().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_still_yields_diagnostics() {
        // Trailing pass flags land in `$0..$n` of the script and are ignored.
        let analyzer = OptAnalyzer::new("sh", "plugin.so", "fi-harden", Duration::from_secs(10))
            .with_args(vec![
                "-c".to_string(),
                "echo 'Warning: Conditional branch in function f' >&2; exit 1".to_string(),
            ]);
        let text = analyzer.analyze(&artifact()).unwrap();
        assert!(text.contains("Conditional branch"));
    }
}
