//! Editor adapter.
//!
//! Everything between the pure join core and the outside world: a
//! line-based [`Document`], line [`Selection`]s, the policy that leaves alone
//! any selection ending on the document's last line, and the two editor
//! commands:
//!
//! - [`join_in_place`]: replace each selected range with its joined line.
//! - [`copy_selections`]: join each selection and write the result to a
//!   clipboard, leaving the document untouched.

pub mod clipboard;
pub mod document;
pub mod selection;

use std::ops::RangeInclusive;

use anyhow::Result;
use serde::Serialize;

pub use clipboard::{ClipboardProvider, CommandClipboard, MemoryClipboard};
pub use document::{Document, LineEnding};
pub use selection::Selection;

use crate::config::schema::GeneralConfig;
use crate::join::join_all_with;
use crate::rules::RuleSet;

// ---------------------------------------------------------------------------
// Options and report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOptions {
    /// Skip selections whose end line is the document's final line.
    pub skip_last_line: bool,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            skip_last_line: true,
        }
    }
}

impl From<&GeneralConfig> for JoinOptions {
    fn from(general: &GeneralConfig) -> Self {
        Self {
            skip_last_line: general.skip_last_line,
        }
    }
}

/// What happened to each selection of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    /// Joined text per applied selection, in document order.
    pub joined: Vec<String>,
    /// Selections left alone because they end on the last line (or, for a
    /// single line, have no next line to join with).
    pub skipped_last_line: Vec<String>,
    /// Selections left alone because they overlap one already joined.
    pub skipped_overlap: Vec<String>,
}

impl JoinReport {
    pub fn applied(&self) -> usize {
        self.joined.len()
    }

    pub fn skipped(&self) -> usize {
        self.skipped_last_line.len() + self.skipped_overlap.len()
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Join every eligible selection in place.
///
/// Selections are applied bottom-up so earlier indices stay valid. A
/// selection overlapping a range that was already joined is skipped.
pub fn join_in_place(
    document: &mut Document,
    selections: &[Selection],
    rules: &RuleSet,
    options: JoinOptions,
) -> Result<JoinReport> {
    validate(document, selections)?;

    let mut ordered = selections.to_vec();
    ordered.sort_by(|a, b| b.cmp(a));
    ordered.dedup();

    let mut report = JoinReport::default();
    let mut lowest_joined: Option<usize> = None;

    for selection in ordered {
        let Some(range) = eligible_range(document, &selection, options) else {
            report.skipped_last_line.push(selection.to_string());
            continue;
        };

        if lowest_joined.is_some_and(|lowest| *range.end() >= lowest) {
            report.skipped_overlap.push(selection.to_string());
            continue;
        }

        let joined = join_all_with(&document.lines()[range.clone()], rules);
        lowest_joined = Some(*range.start());
        document.replace_lines(range, joined.clone());
        report.joined.push(joined);
    }

    report.joined.reverse();
    report.skipped_last_line.reverse();
    report.skipped_overlap.reverse();
    Ok(report)
}

/// Join every eligible selection without editing the document.
///
/// Results keep the order the selections were given in.
pub fn join_selections(
    document: &Document,
    selections: &[Selection],
    rules: &RuleSet,
    options: JoinOptions,
) -> Result<JoinReport> {
    validate(document, selections)?;

    let mut report = JoinReport::default();
    for selection in selections {
        match eligible_range(document, selection, options) {
            Some(range) => report
                .joined
                .push(join_all_with(&document.lines()[range], rules)),
            None => report.skipped_last_line.push(selection.to_string()),
        }
    }

    Ok(report)
}

/// Join the selections and write them to `clipboard`, one per line.
///
/// Nothing is written when every selection was skipped.
pub fn copy_selections(
    document: &Document,
    selections: &[Selection],
    rules: &RuleSet,
    options: JoinOptions,
    clipboard: &dyn ClipboardProvider,
) -> Result<JoinReport> {
    let report = join_selections(document, selections, rules, options)?;

    if !report.joined.is_empty() {
        let text = report.joined.join(document.line_ending().as_str());
        clipboard.set_contents(&text)?;
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reject selections that start or end outside the document.
fn validate(document: &Document, selections: &[Selection]) -> Result<()> {
    let count = document.line_count();
    if let Some(bad) = selections.iter().find(|s| s.end() >= count) {
        anyhow::bail!("selection {bad} is outside the document ({count} lines)");
    }
    Ok(())
}

/// The range a selection joins, or `None` when the last-line policy (or the
/// lack of a next line) rules it out.
fn eligible_range(
    document: &Document,
    selection: &Selection,
    options: JoinOptions,
) -> Option<RangeInclusive<usize>> {
    if options.skip_last_line && document.is_last_line(selection) {
        return None;
    }
    document.join_range(selection)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
