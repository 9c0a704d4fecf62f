//! Pairwise join rule selector.
//!
//! [`join_pair_with`] classifies the accumulated text, then applies the
//! joining policy for that context:
//!
//! | Context          | Policy                                                       |
//! |------------------|--------------------------------------------------------------|
//! | code             | trim both sides, single space, no space next to brackets     |
//! | line comment     | strip one leading comment marker from the next line, space   |
//! | block comment    | strip one continuation marker from the next line, space      |
//! | string literal   | verbatim concatenation                                       |
//!
//! Every function here is pure: the result depends only on the two input
//! strings and the rule set.

pub mod reduce;

pub use reduce::{join_all, join_all_with};

use crate::lexer::{self, JoinContext};
use crate::rules::{RuleSet, default_rules};

/// Accumulated text ending in one of these joins to the next line without a
/// space.
const OPENING_BRACKETS: &[char] = &['(', '[', '{'];

/// A next line starting with one of these joins without a space.
const CLOSING_PUNCTUATION: &[char] = &[')', ']', '}', ',', ';'];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Join two adjacent lines using the default (C-family) rule set.
pub fn join_pair(accumulated: &str, next: &str) -> String {
    join_pair_with(accumulated, next, default_rules())
}

/// Join two adjacent lines using the given rule set.
///
/// Accepts any text. An open comment or literal at the end of `accumulated`
/// only changes which policy applies.
pub fn join_pair_with(accumulated: &str, next: &str, rules: &RuleSet) -> String {
    let context = lexer::classify(accumulated, rules);
    apply_policy(context, accumulated, next, rules)
}

/// Apply the joining policy for an already classified context.
pub fn apply_policy(context: JoinContext, accumulated: &str, next: &str, rules: &RuleSet) -> String {
    match context {
        JoinContext::Code => join_code(accumulated, next),
        JoinContext::LineComment => join_line_comment(accumulated, next, rules),
        JoinContext::BlockComment => join_block_comment(accumulated, next, rules),
        JoinContext::StringLiteral(_) => join_literal(accumulated, next),
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

fn join_code(accumulated: &str, next: &str) -> String {
    let left = accumulated.trim_end();
    let right = next.trim_start();

    if left.ends_with(OPENING_BRACKETS) || right.starts_with(CLOSING_PUNCTUATION) {
        format!("{left}{right}")
    } else {
        space_join(left, right)
    }
}

fn join_line_comment(accumulated: &str, next: &str, rules: &RuleSet) -> String {
    let right = next.trim_start();
    let right = strip_line_comment(right, rules).unwrap_or(right);
    space_join(accumulated.trim_end(), right)
}

fn join_block_comment(accumulated: &str, next: &str, rules: &RuleSet) -> String {
    let right = next.trim_start();
    let right = rules
        .continuation
        .as_deref()
        .and_then(|marker| strip_continuation(right, marker))
        .unwrap_or(right);
    space_join(accumulated.trim_end(), right)
}

fn join_literal(accumulated: &str, next: &str) -> String {
    let mut joined = String::with_capacity(accumulated.len() + next.len());
    joined.push_str(accumulated);
    joined.push_str(next);
    joined
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Join with a single space; an empty side gets no separator.
fn space_join(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_string(),
        (_, true) => left.to_string(),
        _ => format!("{left} {right}"),
    }
}

/// Strip exactly one leading line-comment marker and the whitespace after it.
fn strip_line_comment<'a>(text: &'a str, rules: &RuleSet) -> Option<&'a str> {
    let marker = rules.line_comment_at(text)?;
    Some(text[marker.len()..].trim_start())
}

/// Strip a continuation marker when it stands alone: followed by whitespace
/// or the end of the line. `*/` is not a continuation.
fn strip_continuation<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    if marker.is_empty() {
        return None;
    }
    let rest = text.strip_prefix(marker)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest.trim_start()),
        Some(_) => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin;

    // code ---------------------------------------------------------------

    #[test]
    fn code_is_trimmed_and_single_spaced() {
        assert_eq!(join_pair("let x = 1", "+ 2;"), "let x = 1 + 2;");
        assert_eq!(join_pair("let x =   ", "     1;"), "let x = 1;");
    }

    #[test]
    fn opening_bracket_suppresses_space() {
        assert_eq!(join_pair("foo(", "  bar)"), "foo(bar)");
        assert_eq!(join_pair("let v = [", "1, 2]"), "let v = [1, 2]");
        assert_eq!(join_pair("fn main() {", "    run();"), "fn main() {run();");
    }

    #[test]
    fn closing_punctuation_suppresses_space() {
        assert_eq!(join_pair("foo(a", "  )"), "foo(a)");
        assert_eq!(join_pair("call(x", ", y)"), "call(x, y)");
        assert_eq!(join_pair("let x = 1", ";"), "let x = 1;");
        assert_eq!(join_pair("}", "}"), "}}");
    }

    #[test]
    fn empty_sides_get_no_separator() {
        assert_eq!(join_pair("foo", ""), "foo");
        assert_eq!(join_pair("   ", "bar"), "bar");
        assert_eq!(join_pair("", ""), "");
    }

    #[test]
    fn closed_literal_is_code() {
        assert_eq!(join_pair("let s = \"a\"", "  + b;"), "let s = \"a\" + b;");
    }

    // line comments ------------------------------------------------------

    #[test]
    fn line_comment_marker_is_stripped_once() {
        assert_eq!(join_pair("// foo", "// bar"), "// foo bar");
        assert_eq!(join_pair("// foo", "    //    bar"), "// foo bar");
        assert_eq!(join_pair("// foo", "// // bar"), "// foo // bar");
    }

    #[test]
    fn line_comment_without_marker_on_next_line() {
        assert_eq!(join_pair("x(); // foo", "bar"), "x(); // foo bar");
    }

    #[test]
    fn line_comment_next_line_only_marker() {
        assert_eq!(join_pair("// foo", "//"), "// foo");
    }

    #[test]
    fn doc_comment_markers_use_longest_match() {
        let rust = builtin("rust").unwrap();
        assert_eq!(
            join_pair_with("/// Returns the", "/// joined text.", &rust),
            "/// Returns the joined text."
        );
        assert_eq!(
            join_pair_with("//! Crate", "//! docs", &rust),
            "//! Crate docs"
        );
    }

    #[test]
    fn hash_comments() {
        let py = builtin("python").unwrap();
        assert_eq!(join_pair_with("# a", "#   b", &py), "# a b");
        assert_eq!(join_pair_with("x = 1  # a", "# b", &py), "x = 1  # a b");
    }

    // block comments -----------------------------------------------------

    #[test]
    fn continuation_marker_is_stripped_without_closing() {
        assert_eq!(join_pair("/* start", "* end */"), "/* start end */");
        assert_eq!(join_pair("/* start", "   *   middle"), "/* start middle");
    }

    #[test]
    fn close_marker_passes_through() {
        assert_eq!(join_pair("/* start", " */"), "/* start */");
        assert_eq!(join_pair("/**", " * Docs."), "/** Docs.");
    }

    #[test]
    fn bare_continuation_line_adds_nothing() {
        assert_eq!(join_pair("/* a", " *"), "/* a");
    }

    #[test]
    fn star_without_whitespace_is_content() {
        assert_eq!(join_pair("/* a", "*ptr"), "/* a *ptr");
    }

    #[test]
    fn continuation_is_configurable() {
        let mut rules = RuleSet::default();
        rules.continuation = None;
        assert_eq!(join_pair_with("/* a", "* b", &rules), "/* a * b");

        rules.continuation = Some("**".to_string());
        assert_eq!(join_pair_with("/* a", "** b", &rules), "/* a b");
    }

    // string literals ----------------------------------------------------

    #[test]
    fn literal_content_is_concatenated_verbatim() {
        assert_eq!(join_pair("let s = \"abc", "def\";"), "let s = \"abcdef\";");
        assert_eq!(join_pair("let s = `abc  ", "  def`;"), "let s = `abc    def`;");
    }

    #[test]
    fn comment_marker_in_literal_is_not_a_comment() {
        assert_eq!(join_pair("let u = \"http://x", "y\";"), "let u = \"http://xy\";");
    }

    #[test]
    fn apply_policy_uses_given_context() {
        let rules = default_rules();
        assert_eq!(
            apply_policy(JoinContext::StringLiteral('"'), "a ", " b", rules),
            "a  b"
        );
        assert_eq!(apply_policy(JoinContext::Code, "a ", " b", rules), "a b");
    }
}
