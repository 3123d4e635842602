use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::config::{TimeoutConfig, ToolchainConfig};
use crate::error::HarnessError;
use crate::toolchain::{run_bounded, Compiler, IntermediateArtifact};

/// Emits textual LLVM IR with `clang -S -emit-llvm` (or a configured substitute).
#[derive(Debug, Clone)]
pub struct ClangCompiler {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ClangCompiler {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(toolchain: &ToolchainConfig, timeouts: &TimeoutConfig) -> Self {
        Self::new(
            toolchain.compiler.clone(),
            toolchain.compiler_args.clone(),
            timeouts.compile(),
        )
    }

    fn command(&self, source: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg("-o").arg(output).arg(source);
        command
    }
}

impl Compiler for ClangCompiler {
    fn compile(&self, source: &Path, output: &Path) -> Result<IntermediateArtifact, HarnessError> {
        let result = run_bounded(self.command(source, output), self.timeout)?;
        if !result.status.success() {
            return Err(HarnessError::CompileFailed {
                status: result.status.code(),
                stderr: result.stderr,
            });
        }
        log::debug!("compiled {} -> {}", source.display(), output.display());
        Ok(IntermediateArtifact {
            path: PathBuf::from(output),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_places_output_before_source() {
        let compiler = ClangCompiler::from_config(
            &ToolchainConfig::default(),
            &TimeoutConfig::default(),
        );
        let command = compiler.command(Path::new("fixtures/a.c"), Path::new("out/a.ll"));
        let args: Vec<_> = command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(command.get_program(), "clang");
        assert_eq!(args, vec!["-S", "-emit-llvm", "-o", "out/a.ll", "fixtures/a.c"]);
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_a_compile_failure() {
        let compiler = ClangCompiler::new("false", Vec::new(), Duration::from_secs(10));
        let err = compiler
            .compile(Path::new("a.c"), Path::new("a.ll"))
            .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::CompileFailed {
                status: Some(1),
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn zero_exit_yields_artifact_handle() {
        let compiler = ClangCompiler::new("true", Vec::new(), Duration::from_secs(10));
        let artifact = compiler
            .compile(Path::new("a.c"), Path::new("out/a.ll"))
            .unwrap();
        assert_eq!(artifact.path, PathBuf::from("out/a.ll"));
    }
}
