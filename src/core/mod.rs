//! Shared machinery for the three entry points.
//!
//! Checks, evidence, version control and reporting live here; the
//! check-groups that combine them live in [`crate::plugins`].

pub mod config;
pub mod context;
pub mod error;
pub mod evidence;
pub mod heuristic;
pub mod ignore;
pub mod output;
pub mod report;
pub mod rules;
pub mod syntax;
pub mod time;
pub mod validate;
pub mod vcs;
