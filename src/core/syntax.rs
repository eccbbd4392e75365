//! Structural syntax scan for Python submissions.
//!
//! This is not a grammar. It walks the source once and reports the first
//! structural defect a beginner typically makes: unterminated strings,
//! unbalanced brackets, a compound statement without its colon, and broken
//! indentation. Messages use CPython's wording so students can search them.
//! Anything subtler (a misspelled keyword, `x = = 1`) passes.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

const COMPOUND: &[&str] = &[
    "if", "elif", "else", "while", "for", "def", "class", "try", "except", "finally", "with",
];
const SOFT_COMPOUND: &[&str] = &["match", "case"];
const TAB_WIDTH: usize = 8;

pub fn check_python(source: &str) -> Result<(), SyntaxIssue> {
    Scanner::new(source).run()
}

fn issue(line: usize, message: impl Into<String>) -> SyntaxIssue {
    SyntaxIssue {
        line,
        message: message.into(),
    }
}

#[derive(Debug, Default)]
struct LogicalLine {
    start_line: usize,
    head: String,
    colon_at_top: bool,
    last_sig: Option<char>,
}

impl LogicalLine {
    fn keyword(&self) -> String {
        let ident = |s: &str| -> String {
            s.chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect()
        };
        let first = ident(&self.head);
        if first == "async" {
            ident(self.head[first.len()..].trim_start())
        } else {
            first
        }
    }
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    indents: Vec<usize>,
    brackets: Vec<(char, usize)>,
    pending_block: Option<(usize, String)>,
}

impl Scanner {
    fn new(source: &str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Scanner {
            chars: source.replace("\r\n", "\n").chars().collect(),
            pos: 0,
            line: 1,
            indents: vec![0],
            brackets: Vec::new(),
            pending_block: None,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn run(mut self) -> Result<(), SyntaxIssue> {
        loop {
            let col = self.measure_indent();
            match self.peek() {
                None => break,
                Some('\n') => {
                    self.pos += 1;
                    self.line += 1;
                    continue;
                }
                Some('#') => {
                    self.skip_comment();
                    continue;
                }
                _ => {}
            }
            self.check_indent(col)?;
            let logical = self.scan_logical_line()?;
            if let Some(&(open, line)) = self.brackets.last() {
                return Err(issue(line, format!("'{}' was never closed", open)));
            }
            self.finish_logical(logical)?;
        }

        if let Some((line, kw)) = self.pending_block.take() {
            return Err(issue(self.line, block_message(&kw, line)));
        }
        Ok(())
    }

    fn measure_indent(&mut self) -> usize {
        let mut col = 0;
        while let Some(c) = self.peek() {
            match c {
                ' ' => col += 1,
                '\t' => col = (col / TAB_WIDTH + 1) * TAB_WIDTH,
                '\x0c' => col = 0,
                _ => break,
            }
            self.pos += 1;
        }
        col
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn check_indent(&mut self, col: usize) -> Result<(), SyntaxIssue> {
        let top = self.indents.last().copied().unwrap_or(0);
        if let Some((line, kw)) = self.pending_block.take() {
            if col > top {
                self.indents.push(col);
                return Ok(());
            }
            return Err(issue(self.line, block_message(&kw, line)));
        }
        if col > top {
            return Err(issue(self.line, "unexpected indent"));
        }
        while self.indents.len() > 1 && self.indents.last().is_some_and(|&t| col < t) {
            self.indents.pop();
        }
        if self.indents.last().copied().unwrap_or(0) != col {
            return Err(issue(
                self.line,
                "unindent does not match any outer indentation level",
            ));
        }
        Ok(())
    }

    fn scan_logical_line(&mut self) -> Result<LogicalLine, SyntaxIssue> {
        let mut logical = LogicalLine {
            start_line: self.line,
            ..LogicalLine::default()
        };
        while let Some(c) = self.peek() {
            match c {
                '\n' => {
                    self.pos += 1;
                    self.line += 1;
                    if self.brackets.is_empty() {
                        return Ok(logical);
                    }
                    continue;
                }
                '#' => {
                    self.skip_comment();
                    continue;
                }
                '\\' if self.peek_at(1) == Some('\n') => {
                    self.pos += 2;
                    self.line += 1;
                    logical.head.push(' ');
                    continue;
                }
                '\'' | '"' => {
                    self.scan_string(c)?;
                    logical.head.push('"');
                    logical.last_sig = Some('"');
                    continue;
                }
                '(' | '[' | '{' => self.brackets.push((c, self.line)),
                ')' | ']' | '}' => self.close_bracket(c)?,
                ':' if self.brackets.is_empty() && self.peek_at(1) != Some('=') => {
                    logical.colon_at_top = true;
                }
                _ => {}
            }
            logical.head.push(c);
            if !c.is_whitespace() {
                logical.last_sig = Some(c);
            }
            self.pos += 1;
        }
        Ok(logical)
    }

    fn scan_string(&mut self, quote: char) -> Result<(), SyntaxIssue> {
        let start_line = self.line;
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        if triple {
            self.pos += 3;
            loop {
                match self.peek() {
                    None => {
                        return Err(issue(
                            start_line,
                            format!(
                                "unterminated triple-quoted string literal (detected at line {})",
                                self.line
                            ),
                        ));
                    }
                    Some('\\') => {
                        if self.peek_at(1) == Some('\n') {
                            self.line += 1;
                        }
                        self.pos += 2;
                    }
                    Some('\n') => {
                        self.line += 1;
                        self.pos += 1;
                    }
                    Some(c)
                        if c == quote
                            && self.peek_at(1) == Some(quote)
                            && self.peek_at(2) == Some(quote) =>
                    {
                        self.pos += 3;
                        return Ok(());
                    }
                    Some(_) => self.pos += 1,
                }
            }
        }

        self.pos += 1;
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(issue(
                        start_line,
                        format!(
                            "unterminated string literal (detected at line {})",
                            start_line
                        ),
                    ));
                }
                Some('\\') => {
                    if self.peek_at(1) == Some('\n') {
                        self.line += 1;
                    }
                    self.pos += 2;
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn close_bracket(&mut self, close: char) -> Result<(), SyntaxIssue> {
        let expected_open = match close {
            ')' => '(',
            ']' => '[',
            _ => '{',
        };
        match self.brackets.pop() {
            None => Err(issue(self.line, format!("unmatched '{}'", close))),
            Some((open, _)) if open == expected_open => Ok(()),
            Some((open, line)) if line == self.line => Err(issue(
                self.line,
                format!(
                    "closing parenthesis '{}' does not match opening parenthesis '{}'",
                    close, open
                ),
            )),
            Some((open, line)) => Err(issue(
                self.line,
                format!(
                    "closing parenthesis '{}' does not match opening parenthesis '{}' on line {}",
                    close, open, line
                ),
            )),
        }
    }

    fn finish_logical(&mut self, logical: LogicalLine) -> Result<(), SyntaxIssue> {
        let kw = logical.keyword();
        let compound = COMPOUND.contains(&kw.as_str());
        if compound && !logical.colon_at_top {
            return Err(issue(logical.start_line, "expected ':'"));
        }
        if logical.last_sig == Some(':') {
            if compound || SOFT_COMPOUND.contains(&kw.as_str()) {
                self.pending_block = Some((logical.start_line, kw));
            } else {
                return Err(issue(logical.start_line, "invalid syntax"));
            }
        }
        Ok(())
    }
}

fn block_message(kw: &str, line: usize) -> String {
    match kw {
        "def" => format!(
            "expected an indented block after function definition on line {}",
            line
        ),
        "class" => format!(
            "expected an indented block after class definition on line {}",
            line
        ),
        "" => "expected an indented block".to_string(),
        other => format!(
            "expected an indented block after '{}' statement on line {}",
            other, line
        ),
    }
}
