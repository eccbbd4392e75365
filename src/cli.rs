//! CLI definitions and dispatch for the three entry points.
//!
//! All clap-derived types live here; the binaries under `src/bin/` only parse
//! and hand over. Setup problems (bad `--root`, unreadable `gradegate.toml`)
//! exit 2 so CI can tell them apart from a failed check (exit 1).

use crate::core::context::HarnessContext;
use crate::core::error::GradegateError;
use crate::core::report::Reporter;
use crate::core::validate;
use crate::plugins::milestones;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const SETUP_FAILURE: u8 = 2;

#[derive(clap::Args, Debug)]
pub struct RepoArgs {
    /// Root of the student repository.
    #[clap(long, default_value = ".")]
    pub root: PathBuf,
}

#[derive(Parser, Debug)]
#[clap(
    name = "run-tests",
    version = env!("CARGO_PKG_VERSION"),
    about = "Check the lab submission on your workstation before pushing"
)]
pub struct RunTestsCli {
    #[clap(flatten)]
    pub repo: RepoArgs,
}

#[derive(Parser, Debug)]
#[clap(
    name = "validate-pi",
    version = env!("CARGO_PKG_VERSION"),
    about = "Validate the lab submission on the Raspberry Pi and record markers"
)]
pub struct ValidatePiCli {
    #[clap(flatten)]
    pub repo: RepoArgs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[clap(
    name = "grade",
    version = env!("CARGO_PKG_VERSION"),
    about = "Score the submission against the three milestones"
)]
pub struct GradeCli {
    #[clap(flatten)]
    pub repo: RepoArgs,
    /// Output format: 'text' or 'json'.
    #[clap(long, value_enum, default_value = "text")]
    pub format: Format,
    /// Grade a single milestone (1, 2 or 3).
    #[clap(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub milestone: Option<u8>,
}

fn load_context(root: &Path) -> anyhow::Result<HarnessContext> {
    if !root.is_dir() {
        return Err(GradegateError::NotFound(format!("repository root {}", root.display())).into());
    }
    HarnessContext::load(root)
        .with_context(|| format!("loading configuration under {}", root.display()))
}

/// Exit with the run's own code, or 2 when the run never started.
pub fn exit_with(program: &str, result: anyhow::Result<u8>) -> ExitCode {
    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{}: {:#}", program, err);
            ExitCode::from(SETUP_FAILURE)
        }
    }
}

pub fn run_tests(cli: RunTestsCli) -> anyhow::Result<u8> {
    let ctx = load_context(&cli.repo.root)?;
    let mut rep = Reporter::stdout();
    Ok(validate::run_workstation(&ctx, &mut rep).exit_code())
}

pub fn validate_pi(cli: ValidatePiCli) -> anyhow::Result<u8> {
    let ctx = load_context(&cli.repo.root)?;
    let mut rep = Reporter::stdout();
    Ok(validate::run_device(&ctx, &mut rep).exit_code())
}

pub fn grade(cli: GradeCli) -> anyhow::Result<u8> {
    let ctx = load_context(&cli.repo.root)?;
    let report = milestones::grade(&ctx, cli.milestone);
    match cli.format {
        Format::Json => {
            let json = serde_json::to_string_pretty(&report).context("serializing grade report")?;
            println!("{}", json);
        }
        Format::Text => {
            let mut rep = Reporter::stdout();
            milestones::print_report(&mut rep, &report);
        }
    }
    Ok(report.exit_code())
}
