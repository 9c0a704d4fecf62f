/// Configuration schema and defaults for joinctx.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[general]`, `[clipboard]`, `[logging]`, and `[languages.<tag>]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level joinctx configuration.
///
/// Maps directly to `~/.joinctx/config.toml` and `.joinctx.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinctxConfig {
    pub general: GeneralConfig,
    pub clipboard: ClipboardConfig,
    pub logging: LoggingConfig,
    /// Per-language rule-set overrides, keyed by language tag.
    pub languages: BTreeMap<String, LanguageOverride>,
}

// ---------------------------------------------------------------------------
// [general]
// ---------------------------------------------------------------------------

/// Language tag meaning "infer from the file extension".
pub const AUTO_LANGUAGE: &str = "auto";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Language tag used when `--language` is not given. `auto` infers it
    /// from the input file's extension.
    pub language: String,
    /// Skip selections whose last line is the document's final line.
    pub skip_last_line: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            language: AUTO_LANGUAGE.to_string(),
            skip_last_line: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [clipboard]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// `auto`, `pasteboard`, `wayland`, `xclip`, `xsel`, `termux`, `tmux`,
    /// `win32yank`, or `none`.
    pub provider: String,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            provider: "auto".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Event log settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether each run appends an entry to the event log.
    pub enabled: bool,
    /// Path to the JSONL event log. `~` is expanded to the home directory.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: "~/.joinctx/events.jsonl".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [languages.<tag>]
// ---------------------------------------------------------------------------

/// Override of a language's marker set. Unset fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageOverride {
    /// Built-in rule set to start from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_comments: Option<Vec<String>>,
    /// `[open, close]`. Any other shape disables block comments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_comment: Option<Vec<String>>,
    /// Each character opens and closes its own literal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_delimiters: Option<String>,
    /// Single character; empty disables escapes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escape: Option<String>,
    /// Block-comment continuation marker; empty disables stripping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation: Option<String>,
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl JoinctxConfig {
    /// The annotated config written by `joinctx config init`.
    pub fn default_toml() -> &'static str {
        r#"# joinctx configuration
#
# Layers (later wins): built-in defaults, ~/.joinctx/config.toml,
# .joinctx.toml in the working directory, JOINCTX_* environment variables.

[general]
# Language tag used when --language is not given.
# "auto" infers it from the file extension and falls back to "default".
language = "auto"
# Skip selections that end on the last line of the document.
skip_last_line = true

[clipboard]
# auto | pasteboard | wayland | xclip | xsel | termux | tmux | win32yank | none
provider = "auto"

[logging]
# Append one JSON line per run to the event log.
enabled = false
path = "~/.joinctx/events.jsonl"

# Language overrides. Unset keys keep the base rule set's value.
#
# [languages.jsonc]
# extends = "javascript"
# string_delimiters = "\""
#
# [languages.haskell]
# line_comments = ["--"]
# block_comment = ["{-", "-}"]
# string_delimiters = "\""
# escape = "\\"
# continuation = ""
"#
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_parses_to_defaults() {
        let parsed: JoinctxConfig = toml::from_str(JoinctxConfig::default_toml()).unwrap();
        assert_eq!(parsed, JoinctxConfig::default());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: JoinctxConfig = toml::from_str("[logging]\nenabled = true\n").unwrap();
        assert!(parsed.logging.enabled);
        assert_eq!(parsed.logging.path, LoggingConfig::default().path);
        assert_eq!(parsed.general, GeneralConfig::default());
    }

    #[test]
    fn language_override_parses() {
        let parsed: JoinctxConfig = toml::from_str(
            r#"
[languages.haskell]
line_comments = ["--"]
block_comment = ["{-", "-}"]
escape = ""
"#,
        )
        .unwrap();
        let haskell = &parsed.languages["haskell"];
        assert_eq!(haskell.line_comments, Some(vec!["--".to_string()]));
        assert_eq!(
            haskell.block_comment,
            Some(vec!["{-".to_string(), "-}".to_string()])
        );
        assert_eq!(haskell.escape.as_deref(), Some(""));
        assert!(haskell.extends.is_none());
    }

    #[test]
    fn serializes_round_trip() {
        let config = JoinctxConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: JoinctxConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
