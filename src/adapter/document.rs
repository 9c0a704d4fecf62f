//! Line-oriented document model.
//!
//! Lines are split the way an editor counts them: text ending in a line
//! terminator has a final empty line, so `"a\nb\n"` is three lines. That
//! keeps "the selection ends on the last line" meaning the same thing it
//! means in an editor, and makes [`Document::render`] an exact inverse of
//! [`Document::parse`] for documents with a single line ending style.

use std::ops::RangeInclusive;

use anyhow::Result;

use crate::adapter::selection::Selection;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }

    /// Line ending of the first line break in `text`; LF when there is none.
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(pos) if text[..pos].ends_with('\r') => Self::Crlf,
            _ => Self::Lf,
        }
    }
}

/// A text document as an ordered list of lines without terminators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
    line_ending: LineEnding,
}

impl Document {
    /// Split `text` into lines. Mixed endings are normalised to the first one
    /// found when rendering.
    pub fn parse(text: &str) -> Self {
        let lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();

        Self {
            lines,
            line_ending: LineEnding::detect(text),
        }
    }

    /// Build a document from lines joined with LF.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.as_ref().to_string()).collect(),
            line_ending: LineEnding::Lf,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Index of the final line.
    pub fn last_line(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    /// Whether the selection ends on the document's final line.
    pub fn is_last_line(&self, selection: &Selection) -> bool {
        selection.end() == self.last_line()
    }

    /// Lines the selection joins: a single-line selection also takes the
    /// next line, otherwise `start..=end`. `None` when that range runs past
    /// the end of the document.
    pub fn join_range(&self, selection: &Selection) -> Option<RangeInclusive<usize>> {
        let end = if selection.is_single_line() {
            selection.start() + 1
        } else {
            selection.end()
        };
        (end < self.lines.len()).then_some(selection.start()..=end)
    }

    /// Texts of the lines a selection joins, in document order.
    pub fn lines_for(&self, selection: &Selection) -> Result<&[String]> {
        let Some(range) = self.join_range(selection) else {
            anyhow::bail!(
                "selection {selection} runs past the end of the document ({} lines)",
                self.lines.len()
            );
        };
        Ok(&self.lines[range])
    }

    /// Replace the lines in `range` with a single line.
    pub fn replace_lines(&mut self, range: RangeInclusive<usize>, replacement: String) {
        self.lines.splice(range, std::iter::once(replacement));
    }

    /// Reassemble the document text.
    pub fn render(&self) -> String {
        self.lines.join(self.line_ending.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
