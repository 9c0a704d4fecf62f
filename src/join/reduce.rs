//! Left-to-right reduction of a line sequence.
//!
//! `join` is neither commutative nor associative: each step classifies
//! everything accumulated so far. The fold therefore always runs strictly
//! left to right: `join(join(join(L0, L1), L2), ..., Ln)`.

use crate::join::join_pair_with;
use crate::rules::{RuleSet, default_rules};

/// Reduce `lines` to one line with the default rule set.
pub fn join_all<S: AsRef<str>>(lines: &[S]) -> String {
    join_all_with(lines, default_rules())
}

/// Reduce `lines` to one line with the given rule set.
///
/// A single line is returned unchanged. An empty slice is outside the
/// contract and yields an empty string.
pub fn join_all_with<S: AsRef<str>>(lines: &[S], rules: &RuleSet) -> String {
    let Some((first, rest)) = lines.split_first() else {
        return String::new();
    };

    rest.iter().fold(first.as_ref().to_string(), |acc, line| {
        join_pair_with(&acc, line.as_ref(), rules)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::join_pair;

    #[test]
    fn single_line_is_unchanged() {
        assert_eq!(join_all(&["  keep   me  "]), "  keep   me  ");
        assert_eq!(join_all(&[""]), "");
    }

    #[test]
    fn empty_input_yields_empty_string() {
        let lines: [&str; 0] = [];
        assert_eq!(join_all(&lines), "");
    }

    #[test]
    fn folds_left_to_right() {
        let lines = ["call(", "  a,", "  b", ")"];
        assert_eq!(join_all(&lines), "call(a, b)");
        assert_eq!(
            join_all(&lines),
            join_pair(&join_pair(&join_pair(lines[0], lines[1]), lines[2]), lines[3])
        );
    }

    #[test]
    fn comment_spanning_many_lines() {
        let lines = ["/*", " * one", " * two", " */"];
        assert_eq!(join_all(&lines), "/* one two */");
    }

    #[test]
    fn context_changes_mid_sequence() {
        let lines = ["let s = \"a", "b\"; // c", "// d"];
        assert_eq!(join_all(&lines), "let s = \"ab\"; // c d");
    }

    #[test]
    fn order_matters() {
        let a = "x = \"open";
        let b = "close\"";
        let c = "  y";
        assert_eq!(join_all(&[a, b, c]), "x = \"openclose\" y");
        assert_eq!(join_all(&[a, c, b]), "x = \"open  yclose\"");
    }

    #[test]
    fn accepts_owned_strings() {
        let lines = vec!["a".to_string(), "b".to_string()];
        assert_eq!(join_all(&lines), "a b");
    }
}
