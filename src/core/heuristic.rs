//! Textual heuristics over raw source text.
//!
//! None of these patterns understand the language they scan. A token inside a
//! comment or a string literal counts as present, and an equivalent construct
//! spelled differently counts as absent. Callers must live with both.

use regex::Regex;

#[derive(Debug, Clone)]
pub enum TextPattern {
    Literal(String),
    LiteralIgnoreCase(String),
    Regex(Regex),
    AnyOf(Vec<TextPattern>),
    AllOf(Vec<TextPattern>),
}

impl TextPattern {
    pub fn literal(s: &str) -> Self {
        TextPattern::Literal(s.to_string())
    }

    pub fn ignore_case(s: &str) -> Self {
        TextPattern::LiteralIgnoreCase(s.to_lowercase())
    }

    pub fn any_literal(tokens: &[&str]) -> Self {
        TextPattern::AnyOf(tokens.iter().map(|t| TextPattern::literal(t)).collect())
    }

    pub fn all_literal(tokens: &[&str]) -> Self {
        TextPattern::AllOf(tokens.iter().map(|t| TextPattern::literal(t)).collect())
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            TextPattern::Literal(s) => text.contains(s.as_str()),
            TextPattern::LiteralIgnoreCase(s) => text.to_lowercase().contains(s.as_str()),
            TextPattern::Regex(re) => re.is_match(text),
            TextPattern::AnyOf(parts) => parts.iter().any(|p| p.matches(text)),
            TextPattern::AllOf(parts) => parts.iter().all(|p| p.matches(text)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            TextPattern::Literal(s) => format!("'{}'", s),
            TextPattern::LiteralIgnoreCase(s) => format!("'{}' (any case)", s),
            TextPattern::Regex(re) => format!("/{}/", re.as_str()),
            TextPattern::AnyOf(parts) => join_described(parts, " or "),
            TextPattern::AllOf(parts) => join_described(parts, " and "),
        }
    }
}

fn join_described(parts: &[TextPattern], sep: &str) -> String {
    let inner = parts
        .iter()
        .map(TextPattern::describe)
        .collect::<Vec<_>>()
        .join(sep);
    if parts.len() > 1 {
        format!("({})", inner)
    } else {
        inner
    }
}

/// Tokens from `required` that do not occur anywhere in `text`.
pub fn missing_tokens(text: &str, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|t| !text.contains(**t))
        .map(|t| t.to_string())
        .collect()
}

/// Textual evidence that a sensor read is wrapped in a retry loop.
///
/// `error_name` accepts `Exception` as readily as `RuntimeError`. Catching
/// everything would also hide unrelated bugs, but grading has always accepted
/// it, so it stays permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryEvidence {
    pub has_loop: bool,
    pub has_try_except: bool,
    pub has_error_name: bool,
    pub has_retry_indicator: bool,
}

impl RetryEvidence {
    pub fn scan(text: &str) -> Self {
        RetryEvidence {
            has_loop: loop_pattern().matches(text),
            has_try_except: try_except_pattern().matches(text),
            has_error_name: error_name_pattern().matches(text),
            has_retry_indicator: retry_indicator_pattern().matches(text),
        }
    }

    /// Loop and handler both present. Cannot tell a retry loop from any
    /// unrelated loop that happens to sit next to a try block.
    pub fn loop_with_handler(&self) -> bool {
        self.has_loop && self.has_try_except
    }

    /// Loop, handler, and either an error name or a retry-ish identifier.
    pub fn is_retry_shaped(&self) -> bool {
        self.loop_with_handler() && (self.has_error_name || self.has_retry_indicator)
    }
}

pub fn loop_pattern() -> TextPattern {
    TextPattern::AnyOf(vec![
        TextPattern::all_literal(&["for ", "range("]),
        TextPattern::literal("while "),
    ])
}

pub fn try_except_pattern() -> TextPattern {
    TextPattern::all_literal(&["try:", "except"])
}

pub fn error_name_pattern() -> TextPattern {
    TextPattern::any_literal(&["RuntimeError", "Exception"])
}

pub fn retry_indicator_pattern() -> TextPattern {
    TextPattern::AnyOf(vec![
        TextPattern::ignore_case("retry"),
        TextPattern::ignore_case("attempt"),
        TextPattern::ignore_case("essai"),
        TextPattern::ignore_case("max_"),
        TextPattern::literal("range(3)"),
        TextPattern::literal("range(5)"),
        TextPattern::literal("range(10)"),
    ])
}
