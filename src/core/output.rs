//! Console rendering for harness output.
//!
//! Plain text is what the reporter records; color is only applied when
//! echoing to the terminal, so scraped logs and tests see the same lines.

use colored::{ColoredString, Colorize};

pub const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Pass,
    Fail,
    Warn,
    Skip,
    Info,
    Plain,
    Header,
}

impl Tone {
    pub fn tag(self) -> &'static str {
        match self {
            Tone::Pass => "[PASS]",
            Tone::Fail => "[FAIL]",
            Tone::Warn => "[WARN]",
            Tone::Skip => "[SKIP]",
            Tone::Info => "[INFO]",
            Tone::Plain | Tone::Header => "",
        }
    }
}

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// `[PASS] message`, or the bare message for untagged tones.
pub fn plain_line(tone: Tone, message: &str) -> String {
    let tag = tone.tag();
    if tag.is_empty() {
        message.to_string()
    } else {
        format!("{} {}", tag, message)
    }
}

pub fn paint(tone: Tone, line: &str) -> ColoredString {
    match tone {
        Tone::Pass => line.green(),
        Tone::Fail => line.red(),
        Tone::Warn => line.yellow(),
        Tone::Skip => line.bright_black(),
        Tone::Info => line.blue(),
        Tone::Header => line.bold(),
        Tone::Plain => line.normal(),
    }
}

/// Collapse whitespace and bound length for one-line summaries.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(max_chars).collect();
    format!("{}...", cut)
}

/// First `max_items` messages joined with ` | `, plus a `(+N more)` tail.
pub fn preview_messages(messages: &[String], max_items: usize, max_chars: usize) -> String {
    let shown = messages
        .iter()
        .take(max_items)
        .map(|m| compact_line(m, max_chars))
        .collect::<Vec<_>>()
        .join(" | ");
    match messages.len().checked_sub(max_items) {
        Some(extra) if extra > 0 => format!("{} (+{} more)", shown, extra),
        _ => shown,
    }
}
