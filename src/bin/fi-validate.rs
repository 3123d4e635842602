use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fi_harden_validator::error::ErrorCode;
use fi_harden_validator::toolchain::{ClangCompiler, OptAnalyzer};
use fi_harden_validator::{registry, report, Harness, HarnessConfig, RunSummary};

fn main() -> ExitCode {
    let cli = Cli::parse();
    fi_harden_validator::init_logging(cli.verbose);
    match cli.execute() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("fi-validate error: {err:?}");
            ExitCode::from(1)
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "fi-validate",
    about = "Validate FIHardeningPass diagnostics against known fixtures"
)]
struct Cli {
    /// JSON file overriding the embedded harness configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Also write the run summary as JSON to this path.
    #[arg(long, global = true)]
    summary_json: Option<PathBuf>,
    /// Raise log verbosity on stderr (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile, analyse and validate every fixture (the default).
    Run,
    /// Print the fixture registry with its expected counts.
    List,
}

impl Cli {
    fn execute(self) -> Result<ExitCode> {
        let config = HarnessConfig::resolve(self.config.as_deref())?;
        match self.command.unwrap_or(Command::Run) {
            Command::Run => run_command(&config, self.summary_json),
            Command::List => list_command(&config),
        }
    }
}

fn run_command(config: &HarnessConfig, summary_json: Option<PathBuf>) -> Result<ExitCode> {
    let mut stdout = io::stdout().lock();
    report::write_banner(&mut stdout)?;

    let harness = Harness::new(
        config.paths.clone(),
        ClangCompiler::from_config(&config.toolchain, &config.timeouts),
        OptAnalyzer::from_config(&config.toolchain, &config.timeouts),
    );

    let results = match harness.run(registry()) {
        Ok(results) => results,
        // Already logged by the harness; only the report line remains.
        Err(err) => {
            writeln!(stdout, "Error: {}", err.message())?;
            return Ok(ExitCode::from(1));
        }
    };

    for result in &results {
        report::write_fixture(&mut stdout, result)?;
    }
    let summary = RunSummary::from_results(&results);
    report::write_summary(&mut stdout, &summary)?;
    stdout.flush()?;

    if let Some(path) = summary_json {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("creating summary output directory")?;
        }
        let json = serde_json::to_string_pretty(&report::summary_json(&summary, &results))
            .context("serializing run summary")?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing run summary to {}", path.display()))?;
    }

    Ok(ExitCode::from(summary.exit_code()))
}

fn list_command(config: &HarnessConfig) -> Result<ExitCode> {
    let mut stdout = io::stdout().lock();
    for fixture in registry() {
        let expected = fixture
            .expected_counts
            .iter()
            .map(|(key, count)| format!("{key}={count}"))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            stdout,
            "{} -> {} [{}]",
            fixture.name,
            fixture.source_path(&config.paths.fixture_root).display(),
            expected
        )?;
    }
    Ok(ExitCode::SUCCESS)
}
