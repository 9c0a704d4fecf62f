/// Editor adapter tests.
///
/// Covers the document model, selection parsing, in-place joins with the
/// last-line and overlap policies, and clipboard copies, including a file
/// round trip through a temporary directory.
use std::fs;

use joinctx::adapter::{
    self, ClipboardProvider, Document, JoinOptions, LineEnding, MemoryClipboard, Selection,
    selection,
};
use joinctx::rules::{RuleRegistry, builtin, default_rules};

// ---------------------------------------------------------------------------
// Document and selections
// ---------------------------------------------------------------------------

#[test]
fn selections_parse_from_command_line_form() {
    let parsed = selection::parse_all(&["3", "5:7", "12-10"]).unwrap();
    assert_eq!(
        parsed,
        vec![Selection::line(2), Selection::new(4, 6), Selection::new(9, 11)]
    );
    assert_eq!(parsed[1].to_string(), "5:7");
}

#[test]
fn document_keeps_crlf_through_edits() {
    let mut doc = Document::parse("a(\r\n  b)\r\nc\r\n");
    assert_eq!(doc.line_ending(), LineEnding::Crlf);

    adapter::join_in_place(&mut doc, &[Selection::line(0)], default_rules(), JoinOptions::default())
        .unwrap();
    assert_eq!(doc.render(), "a(b)\r\nc\r\n");
}

// ---------------------------------------------------------------------------
// In-place joins
// ---------------------------------------------------------------------------

#[test]
fn joins_doc_comment_block_in_rust_file() {
    let source = "\
/// Returns the sum
/// of both values.
fn add(
    a: i32,
    b: i32,
) -> i32 {
    a + b
}
";
    let rules = builtin("rust").unwrap();
    let mut doc = Document::parse(source);
    let report = adapter::join_in_place(
        &mut doc,
        &[Selection::new(0, 1), Selection::new(2, 5)],
        &rules,
        JoinOptions::default(),
    )
    .unwrap();

    assert_eq!(report.applied(), 2);
    assert_eq!(
        doc.render(),
        "\
/// Returns the sum of both values.
fn add(a: i32, b: i32,) -> i32 {
    a + b
}
"
    );
}

#[test]
fn selection_touching_last_line_is_left_alone() {
    // Without a trailing newline the final line has content.
    let mut doc = Document::parse("one\ntwo\nthree");
    let report = adapter::join_in_place(
        &mut doc,
        &[Selection::new(0, 1), Selection::new(1, 2)],
        default_rules(),
        JoinOptions::default(),
    )
    .unwrap();

    assert_eq!(doc.render(), "one two\nthree");
    assert_eq!(report.skipped_last_line, vec!["2:3"]);
    assert!(report.skipped_overlap.is_empty());
}

#[test]
fn a_skipped_selection_does_not_stop_later_ones() {
    let mut doc = Document::parse("a\nb\nc\nd");
    let report = adapter::join_in_place(
        &mut doc,
        &[Selection::new(2, 3), Selection::line(0)],
        default_rules(),
        JoinOptions::default(),
    )
    .unwrap();

    assert_eq!(doc.render(), "a b\nc\nd");
    assert_eq!(report.applied(), 1);
    assert_eq!(report.skipped(), 1);
}

#[test]
fn overlapping_selections_keep_the_lower_one() {
    let mut doc = Document::parse("a\nb\nc\nd\ne\n");
    let report = adapter::join_in_place(
        &mut doc,
        &[Selection::new(1, 3), Selection::new(0, 1)],
        default_rules(),
        JoinOptions::default(),
    )
    .unwrap();

    assert_eq!(doc.render(), "a\nb c d\ne\n");
    assert_eq!(report.skipped_overlap, vec!["1:2"]);
}

#[test]
fn configured_language_drives_in_place_join() {
    let toml = r##"
[nim]
extends = "python"
continuation = ""
"##;
    let languages = toml::from_str(toml).unwrap();
    let registry = RuleRegistry::from_overrides(&languages);

    let mut doc = Document::from_lines(&["# a", "# b", "echo x"]);
    adapter::join_in_place(
        &mut doc,
        &[Selection::line(0)],
        &registry.resolve("nim"),
        JoinOptions::default(),
    )
    .unwrap();
    assert_eq!(doc.lines(), &["# a b", "echo x"]);
}

// ---------------------------------------------------------------------------
// Clipboard
// ---------------------------------------------------------------------------

#[test]
fn copy_leaves_document_untouched() {
    let doc = Document::parse("msg = \"hello \nworld\"\nprint(msg)\n");
    let clipboard = MemoryClipboard::new();
    let report = adapter::copy_selections(
        &doc,
        &[Selection::line(0)],
        default_rules(),
        JoinOptions::default(),
        &clipboard,
    )
    .unwrap();

    assert_eq!(report.joined, vec!["msg = \"hello world\""]);
    assert_eq!(clipboard.contents().as_deref(), Some("msg = \"hello world\""));
    assert_eq!(clipboard.name(), "memory");
    assert_eq!(doc.line_count(), 4);
}

#[test]
fn copy_rejects_selection_outside_document() {
    let doc = Document::parse("a\nb");
    let clipboard = MemoryClipboard::new();
    let result = adapter::copy_selections(
        &doc,
        &[Selection::new(0, 7)],
        default_rules(),
        JoinOptions::default(),
        &clipboard,
    );
    assert!(result.is_err());
    assert!(clipboard.writes().is_empty());
}

// ---------------------------------------------------------------------------
// File round trip
// ---------------------------------------------------------------------------

#[test]
fn file_round_trip_preserves_untouched_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("query.sql");
    fs::write(&path, "SELECT id,\n       name\nFROM users -- all of them\n-- no filter\n;\n").unwrap();

    let mut doc = Document::parse(&fs::read_to_string(&path).unwrap());
    adapter::join_in_place(
        &mut doc,
        &selection::parse_all(&["1", "3"]).unwrap(),
        &builtin("sql").unwrap(),
        JoinOptions::default(),
    )
    .unwrap();
    fs::write(&path, doc.render()).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "SELECT id, name\nFROM users -- all of them no filter\n;\n"
    );
}
