//! Line selections.
//!
//! A [`Selection`] is an inclusive range of 0-based line indices. On the
//! command line selections are written 1-based: `7` selects line 7 (which
//! joins it with line 8), `3:5` or `3-5` selects lines 3 through 5.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

static SELECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s*(?:[:-]\s*(\d+))?\s*$").expect("selection regex must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Selection {
    start: usize,
    end: usize,
}

impl Selection {
    /// Selection of lines `a..=b` in either order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Selection of one line.
    pub fn line(index: usize) -> Self {
        Self::new(index, index)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn is_single_line(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Selection {
    /// 1-based, as written on the command line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_line() {
            write!(f, "{}", self.start + 1)
        } else {
            write!(f, "{}:{}", self.start + 1, self.end + 1)
        }
    }
}

impl FromStr for Selection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let caps = SELECTION_RE
            .captures(s)
            .with_context(|| format!("invalid line selection '{s}', expected N or N:M"))?;

        let start = parse_line_number(&caps[1], s)?;
        let end = match caps.get(2) {
            Some(m) => parse_line_number(m.as_str(), s)?,
            None => start,
        };

        Ok(Self::new(start, end))
    }
}

/// Parse a 1-based line number into a 0-based index.
fn parse_line_number(digits: &str, spec: &str) -> Result<usize> {
    let n: usize = digits
        .parse()
        .with_context(|| format!("line number out of range in '{spec}'"))?;
    if n == 0 {
        anyhow::bail!("line numbers start at 1, got '{spec}'");
    }
    Ok(n - 1)
}

/// Parse every `--lines` value.
pub fn parse_all<S: AsRef<str>>(specs: &[S]) -> Result<Vec<Selection>> {
    specs.iter().map(|s| s.as_ref().parse()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_line() {
        let sel: Selection = "7".parse().unwrap();
        assert_eq!(sel, Selection::line(6));
        assert!(sel.is_single_line());
    }

    #[test]
    fn parses_ranges_with_either_separator() {
        assert_eq!("3:5".parse::<Selection>().unwrap(), Selection::new(2, 4));
        assert_eq!(" 3 - 5 ".parse::<Selection>().unwrap(), Selection::new(2, 4));
    }

    #[test]
    fn reversed_range_is_normalised() {
        assert_eq!("5:3".parse::<Selection>().unwrap(), Selection::new(2, 4));
    }

    #[test]
    fn rejects_bad_specs() {
        assert!("0".parse::<Selection>().is_err());
        assert!("1:0".parse::<Selection>().is_err());
        assert!("a:b".parse::<Selection>().is_err());
        assert!("".parse::<Selection>().is_err());
        assert!("1:2:3".parse::<Selection>().is_err());
        assert!("99999999999999999999999".parse::<Selection>().is_err());
    }

    #[test]
    fn display_is_one_based() {
        assert_eq!(Selection::line(0).to_string(), "1");
        assert_eq!(Selection::new(2, 4).to_string(), "3:5");
    }

    #[test]
    fn parse_all_collects_or_fails() {
        assert_eq!(
            parse_all(&["1", "4:6"]).unwrap(),
            vec![Selection::line(0), Selection::new(3, 5)]
        );
        assert!(parse_all(&["1", "x"]).is_err());
    }
}
