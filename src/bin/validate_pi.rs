use clap::Parser;
use gradegate::cli::{self, ValidatePiCli};
use std::process::ExitCode;

fn main() -> ExitCode {
    cli::exit_with("validate-pi", cli::validate_pi(ValidatePiCli::parse()))
}
