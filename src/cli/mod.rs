//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `joinctx join [FILE] [--lines N[:M]]...`: join lines to stdout or in place
//! - `joinctx copy [FILE] --lines N[:M]...`: join selections to the clipboard
//! - `joinctx classify [TEXT]`: show the join context of a text
//! - `joinctx languages`: list the known rule sets
//! - `joinctx stats`: summarize the event log
//! - `joinctx health`: check config, clipboard and event log
//! - `joinctx config show|init|set|reset`: configuration management

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::adapter::{
    self, ClipboardProvider, CommandClipboard, Document, JoinOptions, JoinReport, selection,
};
use crate::analytics::logger::{self, JoinLogEntry};
use crate::analytics::reporter::{self, GroupStat, Stats};
use crate::config::{self, schema::AUTO_LANGUAGE, schema::JoinctxConfig};
use crate::join::join_all_with;
use crate::lexer::{self, Span};
use crate::rules::{self, DEFAULT_LANGUAGE, RuleRegistry, RuleSet};

/// Output format for commands that support machine-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Pick the rule set for a run.
///
/// Order: `--language`, then `[general].language` unless it is `auto`, then
/// the input file's extension, then the default rule set.
pub fn resolve_rules(config: &JoinctxConfig, language: Option<&str>, file: Option<&Path>) -> RuleSet {
    let registry = RuleRegistry::from_overrides(&config.languages);

    let configured = Some(config.general.language.as_str())
        .filter(|tag| !tag.eq_ignore_ascii_case(AUTO_LANGUAGE));
    let tag = language
        .or(configured)
        .or_else(|| file.and_then(rules::language_for_path))
        .unwrap_or(DEFAULT_LANGUAGE);

    if !registry.contains(tag) {
        eprintln!(
            "{} unknown language '{}', using the default rules",
            "warning:".yellow().bold(),
            tag
        );
    }

    registry.resolve(tag)
}

/// Read the whole input from `file`, or from stdin when no file is given.
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

/// Record one run in the event log, marking it failed when `result` is an
/// error.
fn record_run<T>(config: &JoinctxConfig, entry: JoinLogEntry, result: &Result<T>) {
    let entry = match result {
        Ok(_) => entry,
        Err(e) => entry.failed(e),
    };
    logger::record(&config.logging, &entry);
}

fn print_skipped(report: &JoinReport) {
    for sel in &report.skipped_last_line {
        eprintln!(
            "{} selection {} ends on the last line, skipped",
            "·".yellow(),
            sel
        );
    }
    for sel in &report.skipped_overlap {
        eprintln!(
            "{} selection {} overlaps an earlier join, skipped",
            "·".yellow(),
            sel
        );
    }
}

fn report_json(language: &str, report: &JoinReport) -> serde_json::Value {
    serde_json::json!({
        "language": language,
        "joined": report.joined,
        "skipped_last_line": report.skipped_last_line,
        "skipped_overlap": report.skipped_overlap,
    })
}

// ---------------------------------------------------------------------------
// joinctx join
// ---------------------------------------------------------------------------

/// Join lines from `file` or stdin.
///
/// Without selections every input line is joined into one. With selections
/// each one is joined in the document, which is printed or, with
/// `in_place`, written back to `file`.
pub fn run_join(
    file: Option<&Path>,
    lines: &[String],
    language: Option<&str>,
    in_place: bool,
    format: OutputFormat,
) -> Result<()> {
    let config = config::load();
    let rules = resolve_rules(&config, language, file);
    let mut entry = JoinLogEntry::new("join", &rules.name);

    let result = join_input(&config, &rules, file, lines, in_place, &mut entry);
    record_run(&config, entry, &result);
    let outcome = result?;

    match format {
        OutputFormat::Json => {
            let mut value = report_json(&rules.name, &outcome.report);
            if let Some(document) = &outcome.document
                && !in_place
            {
                value["document"] = document.render().into();
            }
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text if in_place => {
            let path = file.map(|p| p.display().to_string()).unwrap_or_default();
            println!(
                "{} Joined {} selection(s) in {}",
                "✓".green().bold(),
                outcome.report.applied(),
                path
            );
            print_skipped(&outcome.report);
        }
        OutputFormat::Text => {
            match &outcome.document {
                Some(document) => print!("{}", document.render()),
                None => {
                    for joined in &outcome.report.joined {
                        println!("{joined}");
                    }
                }
            }
            print_skipped(&outcome.report);
        }
    }

    Ok(())
}

/// Result of `joinctx join`: the report, plus the edited document when
/// selections were given.
#[derive(Debug)]
struct JoinOutcome {
    report: JoinReport,
    document: Option<Document>,
}

fn join_input(
    config: &JoinctxConfig,
    rules: &RuleSet,
    file: Option<&Path>,
    lines: &[String],
    in_place: bool,
    entry: &mut JoinLogEntry,
) -> Result<JoinOutcome> {
    if in_place && file.is_none() {
        anyhow::bail!("--in-place needs a FILE argument");
    }
    if in_place && lines.is_empty() {
        anyhow::bail!("--in-place needs at least one --lines selection");
    }

    let input = read_input(file)?;

    if lines.is_empty() {
        let all: Vec<&str> = input.lines().collect();
        let joined = join_all_with(&all, rules);
        entry.input_lines = all.len();
        entry.selections_applied = usize::from(!all.is_empty());
        entry.output_bytes = joined.len();
        return Ok(JoinOutcome {
            report: JoinReport {
                joined: vec![joined],
                ..JoinReport::default()
            },
            document: None,
        });
    }

    let selections = selection::parse_all(lines)?;
    let mut document = Document::parse(&input);
    entry.input_lines = document.line_count();

    let report = adapter::join_in_place(
        &mut document,
        &selections,
        rules,
        JoinOptions::from(&config.general),
    )?;

    if let Some(path) = file
        && in_place
        && report.applied() > 0
    {
        fs::write(path, document.render())
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    entry.selections_applied = report.applied();
    entry.selections_skipped = report.skipped();
    entry.output_bytes = report.joined.iter().map(String::len).sum();
    Ok(JoinOutcome {
        report,
        document: Some(document),
    })
}

// ---------------------------------------------------------------------------
// joinctx copy
// ---------------------------------------------------------------------------

/// Join the selected lines and put the result on the system clipboard.
pub fn run_copy(
    file: Option<&Path>,
    lines: &[String],
    language: Option<&str>,
    print: bool,
) -> Result<()> {
    let config = config::load();
    let rules = resolve_rules(&config, language, file);
    let mut entry = JoinLogEntry::new("copy", &rules.name);

    let result = copy_input(&config, &rules, file, lines, &mut entry);
    record_run(&config, entry, &result);
    let (report, provider) = result?;

    if report.applied() == 0 {
        println!("{}", "Nothing to copy: every selection was skipped.".yellow());
    } else {
        println!(
            "{} Copied {} joined selection(s) via {}",
            "✓".green().bold(),
            report.applied(),
            provider
        );
    }
    if print {
        for joined in &report.joined {
            println!("{joined}");
        }
    }
    print_skipped(&report);

    Ok(())
}

fn copy_input(
    config: &JoinctxConfig,
    rules: &RuleSet,
    file: Option<&Path>,
    lines: &[String],
    entry: &mut JoinLogEntry,
) -> Result<(JoinReport, String)> {
    let clipboard = CommandClipboard::from_config(&config.clipboard)?;
    let selections = selection::parse_all(lines)?;
    let document = Document::parse(&read_input(file)?);
    entry.input_lines = document.line_count();

    let report = adapter::copy_selections(
        &document,
        &selections,
        rules,
        JoinOptions::from(&config.general),
        &clipboard,
    )?;

    entry.selections_applied = report.applied();
    entry.selections_skipped = report.skipped();
    entry.output_bytes = report.joined.iter().map(String::len).sum();
    Ok((report, clipboard.name().into_owned()))
}

// ---------------------------------------------------------------------------
// joinctx classify
// ---------------------------------------------------------------------------

/// Print the join context in effect at the end of `text` (or stdin).
pub fn run_classify(
    text: Option<&str>,
    language: Option<&str>,
    spans: bool,
    format: OutputFormat,
) -> Result<()> {
    let config = config::load();
    let rules = resolve_rules(&config, language, None);

    let input = match text {
        Some(t) => t.to_string(),
        None => read_input(None)?,
    };
    // A trailing line break from stdin is not part of the line.
    let line = input.strip_suffix('\n').unwrap_or(&input);
    let line = line.strip_suffix('\r').unwrap_or(line);

    let context = lexer::classify(line, &rules);
    let regions = if spans {
        lexer::classify_spans(line, &rules)
    } else {
        Vec::new()
    };

    match format {
        OutputFormat::Json => {
            let mut value = serde_json::json!({
                "language": rules.name,
                "context": context,
            });
            if spans {
                value["spans"] = serde_json::to_value(&regions)?;
            }
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!("{}", context.to_string().bold());
            if spans {
                print_spans(&regions);
            }
        }
    }

    Ok(())
}

fn print_spans(spans: &[Span]) {
    for span in spans {
        println!("  {:<22} {:?}", span.context.to_string().dimmed(), span.text);
    }
}

// ---------------------------------------------------------------------------
// joinctx languages
// ---------------------------------------------------------------------------

/// List every rule set: built-ins with config overrides applied, then
/// config-only languages.
pub fn run_languages(format: OutputFormat) -> Result<()> {
    let config = config::load();
    let registry = RuleRegistry::from_overrides(&config.languages);
    let sets = registry.all();

    match format {
        OutputFormat::Json => {
            let value: Vec<_> = sets.iter().map(rule_set_json).collect();
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!("{}", "Known Languages".bold().cyan());
            println!("{}", "=".repeat(60));
            println!(
                "  {:<12} {:<14} {:<10} {:<8} {}",
                "Language", "Line", "Block", "Strings", "Cont."
            );
            println!("  {}", "-".repeat(58));
            for (i, set) in sets.iter().enumerate() {
                let block = set
                    .block_comment
                    .as_ref()
                    .map(|b| format!("{} {}", b.open, b.close))
                    .unwrap_or_else(|| "-".to_string());
                let line = format!(
                    "  {:<12} {:<14} {:<10} {:<8} {}",
                    truncate(&set.name, 12),
                    or_dash(&set.line_comments.join(" ")),
                    block,
                    or_dash(&set.string_delimiters.iter().collect::<String>()),
                    set.continuation.as_deref().unwrap_or("-"),
                );
                if i % 2 == 0 {
                    println!("{line}");
                } else {
                    println!("{}", line.dimmed());
                }
            }
        }
    }

    Ok(())
}

fn rule_set_json(set: &RuleSet) -> serde_json::Value {
    serde_json::json!({
        "name": set.name,
        "line_comments": set.line_comments,
        "block_comment": set.block_comment.as_ref().map(|b| [&b.open, &b.close]),
        "string_delimiters": set.string_delimiters.iter().collect::<String>(),
        "escape": set.escape.map(String::from),
        "continuation": set.continuation,
    })
}

// ---------------------------------------------------------------------------
// joinctx stats
// ---------------------------------------------------------------------------

/// Summarize the event log.
pub fn run_stats(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let config = config::load();
    let stats = reporter::compute_stats(&config.logging, days);

    if stats.total_runs == 0 {
        let hint = if config.logging.enabled {
            "No runs logged yet."
        } else {
            "No runs logged. Enable logging with: joinctx config set logging.enabled true"
        };
        println!("{}", hint.yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_stats_json(&stats)?,
        OutputFormat::Text => print_stats_table(&stats),
    }

    Ok(())
}

fn print_stats_table(stats: &Stats) {
    println!("{}", "joinctx Run Report".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();

    println!("  {} {}", "Total runs:        ".bold(), format_number(stats.total_runs));
    println!(
        "  {} {} ({:.1}%)",
        "Failed runs:       ".bold(),
        stats.failed_runs,
        stats.failure_pct()
    );
    println!("  {} {}", "Lines read:        ".bold(), format_number(stats.lines_read));
    println!(
        "  {} {}",
        "Selections joined: ".bold(),
        format_number(stats.selections_applied)
    );
    println!(
        "  {} {}",
        "Selections skipped:".bold(),
        format_number(stats.selections_skipped)
    );

    print_group_table("Runs by Command", &stats.commands);
    print_group_table("Runs by Language", &stats.languages);
}

fn print_group_table(title: &str, groups: &[GroupStat]) {
    if groups.is_empty() {
        return;
    }
    println!();
    println!("{}", title.bold().cyan());
    for group in groups.iter().take(10) {
        println!("  {:<20} {:>8}", truncate(&group.name, 20), group.runs);
    }
}

fn print_stats_json(stats: &Stats) -> Result<()> {
    let groups = |groups: &[GroupStat]| {
        groups
            .iter()
            .map(|g| serde_json::json!({ "name": g.name, "runs": g.runs }))
            .collect::<Vec<_>>()
    };
    let value = serde_json::json!({
        "total_runs": stats.total_runs,
        "failed_runs": stats.failed_runs,
        "failure_pct": stats.failure_pct(),
        "lines_read": stats.lines_read,
        "selections_applied": stats.selections_applied,
        "selections_skipped": stats.selections_skipped,
        "commands": groups(&stats.commands),
        "languages": groups(&stats.languages),
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// joinctx health
// ---------------------------------------------------------------------------

/// Check config files, default language, clipboard and event log.
pub fn run_health() -> Result<()> {
    println!("{}", "joinctx Health Check".bold().cyan());
    println!("{}", "=".repeat(50));

    // 1. Config files
    let global = config::global_config_file();
    let global_exists = global.as_ref().is_some_and(|p| p.exists());
    print_health_item(
        "Global config",
        true,
        &match &global {
            Some(p) if global_exists => p.display().to_string(),
            Some(p) => format!("{} (not found, using defaults)", p.display()),
            None => "no home directory".to_string(),
        },
    );
    let project_exists = config::project_config_file().is_some_and(|p| p.exists());
    print_health_item(
        "Project config",
        true,
        if project_exists { ".joinctx.toml" } else { "none" },
    );

    // 2. Default language
    let config = config::load();
    let registry = RuleRegistry::from_overrides(&config.languages);
    let language = &config.general.language;
    let language_ok = language.eq_ignore_ascii_case(AUTO_LANGUAGE) || registry.contains(language);
    print_health_item(
        "Language",
        language_ok,
        &if language_ok {
            language.clone()
        } else {
            format!("{language} is unknown, the default rules will be used")
        },
    );

    // 3. Clipboard
    let (clipboard_ok, clipboard_detail) = match CommandClipboard::from_config(&config.clipboard) {
        Ok(CommandClipboard::None) => (false, "no clipboard command found".to_string()),
        Ok(provider) => (true, provider.name().into_owned()),
        Err(e) => (false, format!("{e:#}")),
    };
    print_health_item("Clipboard", clipboard_ok, &clipboard_detail);

    // 4. Event log
    if config.logging.enabled {
        let path = logger::log_path(&config.logging);
        let exists = path.as_ref().is_some_and(|p| p.exists());
        let detail = if exists {
            format!("{} entries", logger::read_all_entries(&config.logging).len())
        } else {
            "no log file yet".to_string()
        };
        print_health_item("Event log", true, &detail);
    } else {
        print_health_item("Event log", true, "disabled");
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// joinctx config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective joinctx Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file().is_some_and(|p| p.exists());
    let project_exists = config::project_config_file().is_some_and(|p| p.exists());
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.joinctx/config.toml", global_exists);
    print_source(".joinctx.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "JOINCTX_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.joinctx/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Edit the file to add languages or change defaults.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a number with comma separators for readability.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
