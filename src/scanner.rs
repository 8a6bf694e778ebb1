//! Resumable statement scanner.
//!
//! Splits a character stream into `;`-terminated statements without being fooled by
//! semicolons inside string literals, quoted identifiers, comments or parentheses.
//! Comments are stripped from the emitted text; a block comment directly following
//! other text leaves a single space behind. All parse context lives in a
//! [`ScanState`] value, so input can be pushed chunk by chunk and a delimiter split
//! across two chunks (`-` `-`, `/` `*`, `'` `'`) is still recognized.

use crate::str_utils::starts_with_ignore_case;
use std::collections::VecDeque;
use std::fmt;
use std::str::Chars;

/// Lexical region the scanner is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    #[default]
    Normal,
    /// A `-` outside quotes, possibly the start of `--`
    Dash,
    /// A `/` outside quotes, possibly the start of `/*`
    Slash,
    SingleQuote,
    /// A `'` inside a string: closes it unless another `'` follows
    SingleQuoteEnd,
    QuotedIdentifier,
    /// A `"` inside a quoted identifier: closes it unless another `"` follows
    QuotedIdentifierEnd,
    LineComment,
    BlockComment,
    /// A `*` inside a block comment, possibly the start of `*/`
    BlockCommentStar,
}

/// Mutable parse context carried across chunk boundaries
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    mode: ScanMode,
    paren_depth: usize,
    buffer: String,
    /// Statements completed by the unread rest of a dropped [`Feed`]
    deferred: VecDeque<Statement>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn paren_depth(&self) -> usize {
        self.paren_depth
    }

    /// Text accumulated for the statement currently being built
    pub fn pending_text(&self) -> &str {
        &self.buffer
    }

    pub fn in_single_quote(&self) -> bool {
        matches!(self.mode, ScanMode::SingleQuote | ScanMode::SingleQuoteEnd)
    }

    pub fn in_quoted_identifier(&self) -> bool {
        matches!(
            self.mode,
            ScanMode::QuotedIdentifier | ScanMode::QuotedIdentifierEnd
        )
    }

    pub fn in_line_comment(&self) -> bool {
        self.mode == ScanMode::LineComment
    }

    pub fn in_block_comment(&self) -> bool {
        matches!(
            self.mode,
            ScanMode::BlockComment | ScanMode::BlockCommentStar
        )
    }

    /// Advance the machine by one character, returning a statement when `c` terminates one
    fn step(&mut self, c: char) -> Option<Statement> {
        match self.mode {
            ScanMode::Normal => self.step_normal(c),
            ScanMode::Dash => {
                if c == '-' {
                    self.mode = ScanMode::LineComment;
                    None
                } else {
                    self.buffer.push('-');
                    self.mode = ScanMode::Normal;
                    self.step_normal(c)
                }
            }
            ScanMode::Slash => {
                if c == '*' {
                    self.mode = ScanMode::BlockComment;
                    None
                } else {
                    self.buffer.push('/');
                    self.mode = ScanMode::Normal;
                    self.step_normal(c)
                }
            }
            ScanMode::SingleQuote => {
                self.buffer.push(c);
                if c == '\'' {
                    self.mode = ScanMode::SingleQuoteEnd;
                }
                None
            }
            ScanMode::SingleQuoteEnd => {
                if c == '\'' {
                    // '' escape, still inside the string
                    self.buffer.push(c);
                    self.mode = ScanMode::SingleQuote;
                    None
                } else {
                    self.mode = ScanMode::Normal;
                    self.step_normal(c)
                }
            }
            ScanMode::QuotedIdentifier => {
                self.buffer.push(c);
                if c == '"' {
                    self.mode = ScanMode::QuotedIdentifierEnd;
                }
                None
            }
            ScanMode::QuotedIdentifierEnd => {
                if c == '"' {
                    self.buffer.push(c);
                    self.mode = ScanMode::QuotedIdentifier;
                    None
                } else {
                    self.mode = ScanMode::Normal;
                    self.step_normal(c)
                }
            }
            ScanMode::LineComment => {
                if c == '\r' || c == '\n' {
                    self.buffer.push(c);
                    self.mode = ScanMode::Normal;
                }
                None
            }
            ScanMode::BlockComment => {
                if c == '*' {
                    self.mode = ScanMode::BlockCommentStar;
                }
                None
            }
            ScanMode::BlockCommentStar => {
                self.mode = match c {
                    '/' => {
                        // text around the comment must not join into a new delimiter
                        if self
                            .buffer
                            .chars()
                            .next_back()
                            .is_some_and(|last| !last.is_whitespace())
                        {
                            self.buffer.push(' ');
                        }
                        ScanMode::Normal
                    }
                    '*' => ScanMode::BlockCommentStar,
                    _ => ScanMode::BlockComment,
                };
                None
            }
        }
    }

    fn step_normal(&mut self, c: char) -> Option<Statement> {
        match c {
            '-' => self.mode = ScanMode::Dash,
            '/' => self.mode = ScanMode::Slash,
            '\'' => {
                self.buffer.push(c);
                self.mode = ScanMode::SingleQuote;
            }
            '"' => {
                self.buffer.push(c);
                self.mode = ScanMode::QuotedIdentifier;
            }
            '(' => {
                self.paren_depth += 1;
                self.buffer.push(c);
            }
            ')' => {
                self.paren_depth = self.paren_depth.saturating_sub(1);
                self.buffer.push(c);
            }
            ';' if self.paren_depth == 0 => return self.take_statement(),
            _ => self.buffer.push(c),
        }
        None
    }

    /// Emit the buffered text as a statement; blank buffers produce nothing
    fn take_statement(&mut self) -> Option<Statement> {
        let text = self.buffer.trim();
        let statement = if text.is_empty() {
            None
        } else {
            Some(Statement(text.to_string()))
        };
        self.buffer.clear();
        statement
    }

    fn flush(&mut self) -> Option<Statement> {
        match self.mode {
            ScanMode::Dash => self.buffer.push('-'),
            ScanMode::Slash => self.buffer.push('/'),
            _ => {}
        }
        let statement = self.take_statement();
        self.mode = ScanMode::Normal;
        self.paren_depth = 0;
        statement
    }
}

/// One SQL command with comments stripped, terminator removed and surrounding whitespace trimmed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement(String);

impl Statement {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// True when the statement starts with the INSERT keyword (case-insensitive)
    pub fn is_insert(&self) -> bool {
        starts_with_ignore_case(&self.0, "INSERT")
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Statement {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Statement> for String {
    fn from(statement: Statement) -> Self {
        statement.0
    }
}

impl PartialEq<&str> for Statement {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Push-driven statement splitter.
///
/// A scanner is single-use per input: two passes over the same source need two
/// scanners, and both produce the same statement sequence.
#[derive(Debug, Default)]
pub struct Scanner {
    state: ScanState,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume scanning from a previously captured state
    pub fn from_state(state: ScanState) -> Self {
        Scanner { state }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Feed the next chunk of input. Statements are produced lazily as the returned
    /// iterator is advanced. Dropping it early scans the rest of the chunk anyway and
    /// holds back the statements it completes for the next feed or [`Scanner::finish`].
    pub fn feed<'s, 'c>(&'s mut self, chunk: &'c str) -> Feed<'s, 'c> {
        Feed {
            state: &mut self.state,
            chars: chunk.chars(),
        }
    }

    /// Emit held-back statements plus a trailing one not terminated by `;`, and reset
    /// all state
    pub fn finish(&mut self) -> Vec<Statement> {
        let mut statements: Vec<Statement> = self.state.deferred.drain(..).collect();
        statements.extend(self.state.flush());
        statements
    }
}

/// Lazy sequence of statements completed by one chunk
pub struct Feed<'s, 'c> {
    state: &'s mut ScanState,
    chars: Chars<'c>,
}

impl Iterator for Feed<'_, '_> {
    type Item = Statement;

    fn next(&mut self) -> Option<Statement> {
        if let Some(statement) = self.state.deferred.pop_front() {
            return Some(statement);
        }
        for c in self.chars.by_ref() {
            if let Some(statement) = self.state.step(c) {
                return Some(statement);
            }
        }
        None
    }
}

impl Drop for Feed<'_, '_> {
    fn drop(&mut self) {
        for c in self.chars.by_ref() {
            if let Some(statement) = self.state.step(c) {
                self.state.deferred.push_back(statement);
            }
        }
    }
}

/// Split a complete SQL text into statements
pub fn split_sql_statements(sql: &str) -> Vec<Statement> {
    let mut scanner = Scanner::new();
    let mut statements: Vec<Statement> = scanner.feed(sql).collect();
    statements.extend(scanner.finish());
    statements
}
