//! Git workflow check-groups: feature branches, commit style, device setup.

use crate::core::context::HarnessContext;
use crate::core::error::CheckError;
use crate::core::report::{GroupStatus, Reporter};
use crate::core::rules::{self, conventional_commit_regex};

pub const BRANCHES_MARKER: &str = "git_branches_verified";
pub const COMMITS_MARKER: &str = "git_commits_verified";
pub const SETUP_MARKER: &str = "git_verified";

const DEVICE_HISTORY: usize = 5;

/// Required feature branches must show up either as branches (local or
/// remote) or in a merge-commit subject, for students who deleted them after
/// merging.
pub fn check_branches(ctx: &HarnessContext, rep: &mut Reporter) -> Result<GroupStatus, CheckError> {
    rep.header("GIT BRANCHES VERIFICATION");
    if !ctx.vcs.is_repository()? {
        rep.warn("Not inside a git repository");
        return Ok(GroupStatus::Skipped);
    }
    rep.pass("Git repository detected");

    let required = &ctx.config.git.required_branches;
    let listed = ctx.vcs.branches()?;
    let mut found: Vec<&str> = Vec::new();
    for branch in required {
        if listed.iter().any(|l| l.contains(branch.as_str())) {
            rep.pass(&format!("Branch found: {}", branch));
            found.push(branch);
        } else {
            rep.warn(&format!("Branch not found: {}", branch));
        }
    }

    if found.len() < required.len() {
        let merges = ctx.vcs.merge_subjects()?;
        for branch in required {
            if found.contains(&branch.as_str()) {
                continue;
            }
            if merges.iter().any(|m| m.contains(branch.as_str())) {
                rep.pass(&format!("Merged branch detected: {}", branch));
                found.push(branch);
            }
        }
    }

    let missing: Vec<&str> = required
        .iter()
        .map(String::as_str)
        .filter(|b| !found.contains(b))
        .collect();
    if !missing.is_empty() {
        rep.fail(&format!("Missing branches: {}", missing.join(", ")));
        rep.note(&format!("Create them with: git checkout -b {}", missing[0]));
        return Ok(GroupStatus::Failed);
    }

    ctx.evidence.put(
        BRANCHES_MARKER,
        "Git branches verified",
        &format!("Branches found: {}", found.join(", ")),
    )?;
    rep.info(&format!("Marker created: {}.txt", BRANCHES_MARKER));
    Ok(GroupStatus::Passed)
}

/// Reports how many recent subjects follow `type(scope): description`.
/// Informational: a low ratio warns but the group still passes.
pub fn check_commit_style(
    ctx: &HarnessContext,
    rep: &mut Reporter,
) -> Result<GroupStatus, CheckError> {
    rep.header("COMMIT MESSAGE VERIFICATION");
    let report = rules::check_commit_history(
        ctx.vcs.as_ref(),
        Some(ctx.config.git.recent_commits),
        0,
        Some(conventional_commit_regex()),
    )?;

    if report.total() == 0 {
        rep.warn("No commits found");
    } else {
        rep.note(&format!(
            "Conventional commits: {}/{} ({:.0}%)",
            report.conventional,
            report.total(),
            report.conventional_ratio() * 100.0
        ));
        if report.conventional_ratio() >= 0.5 {
            rep.pass("Commit format generally conforms");
        } else {
            rep.warn("Fewer than 50% of commits follow the conventional format");
            rep.note("Expected: feat(led): add blink loop");
        }
    }

    ctx.evidence.put(
        COMMITS_MARKER,
        "Git commits verified",
        &format!("Conventional commits: {}/{}", report.conventional, report.total()),
    )?;
    rep.info(&format!("Marker created: {}.txt", COMMITS_MARKER));
    Ok(GroupStatus::Passed)
}

/// On-device sanity check. Never blocking.
pub fn check_git_setup(
    ctx: &HarnessContext,
    rep: &mut Reporter,
) -> Result<GroupStatus, CheckError> {
    rep.header("GIT SETUP VERIFICATION");
    if !ctx.vcs.is_repository()? {
        rep.warn("Not inside a git repository");
        return Ok(GroupStatus::Skipped);
    }
    rep.pass("Git repository detected");

    let commits = ctx.vcs.history(Some(DEVICE_HISTORY))?;
    rep.info(&format!("Found {} recent commits", commits.len()));

    match ctx.vcs.user_name()? {
        Some(name) => rep.pass(&format!("Git user: {}", name)),
        None => {
            rep.warn("Git user.name is not configured");
            rep.note("Run: git config --global user.name \"Your Name\"");
        }
    }

    ctx.evidence.put(
        SETUP_MARKER,
        "Verified",
        &format!("Git setup verified, {} commits", commits.len()),
    )?;
    Ok(GroupStatus::Passed)
}
