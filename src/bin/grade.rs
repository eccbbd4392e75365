use clap::Parser;
use gradegate::cli::{self, GradeCli};
use std::process::ExitCode;

fn main() -> ExitCode {
    cli::exit_with("grade", cli::grade(GradeCli::parse()))
}
