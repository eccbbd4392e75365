//! gradegate: submission checks for the embedded-systems lab.
//!
//! Students hand in a GPIO LED script, an optional RGB bonus script and a
//! DHT22 sensor script in a git repository. gradegate checks those artifacts
//! at three points:
//!
//! - `run-tests` on the student's workstation before pushing
//! - `validate-pi` on the Raspberry Pi, which also looks for retry logic
//! - `grade` in CI, which scores the three milestones out of 100
//!
//! The local runs leave marker files in `.test_markers/`; the grader trusts
//! them as evidence that the local checks passed.
//!
//! # Examples
//!
//! ```bash
//! run-tests
//! validate-pi --root ~/formatif-f2
//! grade --format json --milestone 2
//! ```
//!
//! An optional `gradegate.toml` at the repository root overrides file names,
//! required branches and git timeouts. `GRADEGATE_TRACE=1` traces each
//! check-group to stderr.

pub mod cli;
pub mod core;
pub mod plugins;

pub use crate::core::context::HarnessContext;
pub use crate::core::error::{CheckError, GradegateError};
pub use crate::core::report::{Reporter, RunSummary};
