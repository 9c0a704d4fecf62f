//! Event log reporter for `joinctx stats`.
//!
//! Aggregates the JSONL event log into run counts per command and per
//! language, plus totals of joined selections and skips.

use std::collections::HashMap;

use crate::analytics::logger::{self, JoinLogEntry};
use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Aggregated stats
// ---------------------------------------------------------------------------

/// Summary statistics for `joinctx stats`.
#[derive(Debug, Default)]
pub struct Stats {
    pub total_runs: usize,
    pub failed_runs: usize,
    pub selections_applied: usize,
    pub selections_skipped: usize,
    pub lines_read: usize,
    pub commands: Vec<GroupStat>,
    pub languages: Vec<GroupStat>,
}

/// Run count for one command or language, sorted most frequent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStat {
    pub name: String,
    pub runs: usize,
}

impl Stats {
    /// Share of failed runs, 0.0 when nothing was logged.
    pub fn failure_pct(&self) -> f64 {
        if self.total_runs == 0 {
            0.0
        } else {
            (self.failed_runs as f64 / self.total_runs as f64) * 100.0
        }
    }
}

// ---------------------------------------------------------------------------
// Stats computation
// ---------------------------------------------------------------------------

/// Compute stats from the configured log, optionally limited to the last
/// `days` days.
pub fn compute_stats(config: &LoggingConfig, days: Option<u32>) -> Stats {
    let entries = logger::read_entries_since_days(config, days);
    build_stats(&entries)
}

/// Aggregate a set of entries.
pub fn build_stats(entries: &[JoinLogEntry]) -> Stats {
    Stats {
        total_runs: entries.len(),
        failed_runs: entries.iter().filter(|e| !e.success).count(),
        selections_applied: entries.iter().map(|e| e.selections_applied).sum(),
        selections_skipped: entries.iter().map(|e| e.selections_skipped).sum(),
        lines_read: entries.iter().map(|e| e.input_lines).sum(),
        commands: group_by(entries, |e| e.command.as_str()),
        languages: group_by(entries, |e| e.language.as_str()),
    }
}

fn group_by<'a>(
    entries: &'a [JoinLogEntry],
    key: impl Fn(&'a JoinLogEntry) -> &'a str,
) -> Vec<GroupStat> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        *counts.entry(key(entry)).or_default() += 1;
    }

    let mut groups: Vec<GroupStat> = counts
        .into_iter()
        .map(|(name, runs)| GroupStat {
            name: name.to_string(),
            runs,
        })
        .collect();

    // Most frequent first, ties by name for stable output
    groups.sort_by(|a, b| b.runs.cmp(&a.runs).then_with(|| a.name.cmp(&b.name)));
    groups
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(command: &str, language: &str, applied: usize, skipped: usize) -> JoinLogEntry {
        let mut e = JoinLogEntry::new(command, language);
        e.input_lines = 10;
        e.selections_applied = applied;
        e.selections_skipped = skipped;
        e
    }

    #[test]
    fn totals_and_groups() {
        let entries = vec![
            entry("join", "rust", 2, 0),
            entry("join", "rust", 1, 1),
            entry("copy", "python", 1, 0),
            entry("join", "default", 0, 0).failed(&anyhow::anyhow!("boom")),
        ];
        let stats = build_stats(&entries);

        assert_eq!(stats.total_runs, 4);
        assert_eq!(stats.failed_runs, 1);
        assert_eq!(stats.selections_applied, 4);
        assert_eq!(stats.selections_skipped, 1);
        assert_eq!(stats.lines_read, 40);
        assert!((stats.failure_pct() - 25.0).abs() < f64::EPSILON);

        assert_eq!(
            stats.commands,
            vec![
                GroupStat { name: "join".to_string(), runs: 3 },
                GroupStat { name: "copy".to_string(), runs: 1 },
            ]
        );
        assert_eq!(stats.languages[0], GroupStat { name: "rust".to_string(), runs: 2 });
        assert_eq!(stats.languages[1].name, "default");
        assert_eq!(stats.languages[2].name, "python");
    }

    #[test]
    fn empty_entries() {
        let stats = build_stats(&[]);
        assert_eq!(stats.total_runs, 0);
        assert_eq!(stats.failure_pct(), 0.0);
        assert!(stats.commands.is_empty());
    }
}
