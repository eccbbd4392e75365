//! `.gitignore` rewrite that lets the marker directory be committed.

use crate::core::error::GradegateError;
use std::fs;
use std::path::Path;

pub const GITIGNORE: &str = ".gitignore";

pub fn allow_comment(dir_name: &str) -> String {
    format!("# {}/ is now allowed (created by run-tests)", dir_name)
}

/// Drops every non-comment line mentioning `dir_name`; the first one is
/// replaced by [`allow_comment`]. `None` when nothing needed changing.
pub fn rewrite_ignore_text(text: &str, dir_name: &str) -> Option<String> {
    let mut out: Vec<String> = Vec::new();
    let mut modified = false;
    for line in text.lines() {
        if line.contains(dir_name) && !line.trim_start().starts_with('#') {
            if !modified {
                out.push(allow_comment(dir_name));
                modified = true;
            }
        } else {
            out.push(line.to_string());
        }
    }
    modified.then(|| out.join("\n") + "\n")
}

/// Rewrites `<repo_root>/.gitignore` in place. Only acts when both the marker
/// directory and the ignore file exist. Returns whether the file changed.
pub fn allow_marker_dir(repo_root: &Path, dir_name: &str) -> Result<bool, GradegateError> {
    let ignore_path = repo_root.join(GITIGNORE);
    if !repo_root.join(dir_name).is_dir() || !ignore_path.is_file() {
        return Ok(false);
    }
    let text = fs::read_to_string(&ignore_path).map_err(GradegateError::IoError)?;
    match rewrite_ignore_text(&text, dir_name) {
        Some(updated) => {
            fs::write(&ignore_path, updated).map_err(GradegateError::IoError)?;
            Ok(true)
        }
        None => Ok(false),
    }
}
