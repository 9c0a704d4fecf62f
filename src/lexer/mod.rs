//! Lexical context classifier.
//!
//! Scans accumulated text left to right and reports which syntactic region
//! is open at the end of it: plain code, a line comment, a block comment, or
//! a string literal opened by a specific delimiter.
//!
//! The scanner is a finite-state automaton split in two halves:
//!
//! - [`next_token`] recognises the marker at the cursor. Which markers are
//!   live depends on the current state (escapes only matter inside literals,
//!   the close marker only inside block comments).
//! - [`transition`] is a pure, exhaustive `(state, token) -> state` table.
//!
//! Nothing is carried between calls. Every join re-scans the accumulated
//! text from [`LexState::Code`], and an open comment or literal at the end of
//! the text is a normal result, not an error.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::rules::RuleSet;

// ---------------------------------------------------------------------------
// Context and states
// ---------------------------------------------------------------------------

/// Syntactic region in effect at the join point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "delimiter", rename_all = "kebab-case")]
pub enum JoinContext {
    Code,
    LineComment,
    BlockComment,
    /// Inside a literal opened by this delimiter.
    StringLiteral(char),
}

impl fmt::Display for JoinContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code => write!(f, "code"),
            Self::LineComment => write!(f, "line-comment"),
            Self::BlockComment => write!(f, "block-comment"),
            Self::StringLiteral(delim) => write!(f, "string-literal({delim})"),
        }
    }
}

/// Scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexState {
    Code,
    InLineComment,
    InBlockComment,
    InLiteral(char),
}

impl From<LexState> for JoinContext {
    fn from(state: LexState) -> Self {
        match state {
            LexState::Code => Self::Code,
            LexState::InLineComment => Self::LineComment,
            LexState::InBlockComment => Self::BlockComment,
            LexState::InLiteral(delim) => Self::StringLiteral(delim),
        }
    }
}

/// Marker recognised at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    LineCommentOpen,
    BlockCommentOpen,
    BlockCommentClose,
    Delimiter(char),
    /// Escape prefix plus the character it escapes.
    Escaped,
    /// Any other character.
    Text,
}

// ---------------------------------------------------------------------------
// Automaton
// ---------------------------------------------------------------------------

/// Recognise the token at the start of `rest`.
///
/// Returns the token and its length in bytes. The length covers at least one
/// character, except for an empty `rest`, which yields `(Token::Text, 0)`.
pub fn next_token(state: LexState, rest: &str, rules: &RuleSet) -> (Token, usize) {
    let Some(first) = rest.chars().next() else {
        return (Token::Text, 0);
    };
    let text = (Token::Text, first.len_utf8());

    match state {
        LexState::Code => {
            let line = rules.line_comment_at(rest).map(str::len);
            let block = rules
                .block_comment
                .as_ref()
                .filter(|b| !b.open.is_empty() && rest.starts_with(b.open.as_str()))
                .map(|b| b.open.len());

            match (line, block) {
                (Some(l), Some(b)) if b > l => (Token::BlockCommentOpen, b),
                (Some(l), _) => (Token::LineCommentOpen, l),
                (None, Some(b)) => (Token::BlockCommentOpen, b),
                (None, None) if rules.is_delimiter(first) => {
                    (Token::Delimiter(first), first.len_utf8())
                }
                (None, None) => text,
            }
        }
        // A line comment runs to the end of the text.
        LexState::InLineComment => (Token::Text, rest.len()),
        LexState::InBlockComment => match &rules.block_comment {
            Some(b) if !b.close.is_empty() && rest.starts_with(b.close.as_str()) => {
                (Token::BlockCommentClose, b.close.len())
            }
            _ => text,
        },
        LexState::InLiteral(_) => {
            if rules.escape == Some(first) {
                let escaped = rest[first.len_utf8()..]
                    .chars()
                    .next()
                    .map_or(0, char::len_utf8);
                (Token::Escaped, first.len_utf8() + escaped)
            } else if rules.is_delimiter(first) {
                (Token::Delimiter(first), first.len_utf8())
            } else {
                text
            }
        }
    }
}

/// State transition table.
pub fn transition(state: LexState, token: Token) -> LexState {
    use LexState::*;

    match (state, token) {
        (Code, Token::LineCommentOpen) => InLineComment,
        (Code, Token::BlockCommentOpen) => InBlockComment,
        (Code, Token::Delimiter(delim)) => InLiteral(delim),
        (Code, Token::BlockCommentClose | Token::Escaped | Token::Text) => Code,

        (InLineComment, _) => InLineComment,

        (InBlockComment, Token::BlockCommentClose) => Code,
        (
            InBlockComment,
            Token::LineCommentOpen
            | Token::BlockCommentOpen
            | Token::Delimiter(_)
            | Token::Escaped
            | Token::Text,
        ) => InBlockComment,

        (InLiteral(open), Token::Delimiter(delim)) if delim == open => Code,
        (
            InLiteral(open),
            Token::LineCommentOpen
            | Token::BlockCommentOpen
            | Token::BlockCommentClose
            | Token::Delimiter(_)
            | Token::Escaped
            | Token::Text,
        ) => InLiteral(open),
    }
}

/// Run the automaton over `text` from the initial state.
pub fn scan(text: &str, rules: &RuleSet) -> LexState {
    let mut state = LexState::Code;
    let mut pos = 0;

    while pos < text.len() {
        let (token, len) = next_token(state, &text[pos..], rules);
        state = transition(state, token);
        pos += len;
    }

    state
}

/// Context in effect at the end of `text`.
pub fn classify(text: &str, rules: &RuleSet) -> JoinContext {
    scan(text, rules).into()
}

// ---------------------------------------------------------------------------
// Spans
// ---------------------------------------------------------------------------

/// A maximal run of text scanned in one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub context: JoinContext,
    #[serde(skip)]
    pub range: Range<usize>,
    pub text: String,
}

/// Split `text` into regions.
///
/// Opening markers belong to the region they open and closing markers to the
/// region they close, so `"a"` is one literal span including both quotes.
pub fn classify_spans(text: &str, rules: &RuleSet) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut state = LexState::Code;
    let mut pos = 0;

    while pos < text.len() {
        let (token, len) = next_token(state, &text[pos..], rules);
        let next = transition(state, token);
        let owner = if next == LexState::Code { state } else { next };
        let end = pos + len;

        match spans.last_mut() {
            Some(last) if last.context == JoinContext::from(owner) && last.range.end == pos => {
                last.range.end = end;
                last.text.push_str(&text[pos..end]);
            }
            _ => spans.push(Span {
                context: owner.into(),
                range: pos..end,
                text: text[pos..end].to_string(),
            }),
        }

        state = next;
        pos = end;
    }

    spans
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
