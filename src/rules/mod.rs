//! Language rule sets for the classifier and the join rule selector.
//!
//! A [`RuleSet`] is the marker vocabulary of one language: which tokens open
//! a line comment, which pair delimits a block comment, which characters
//! open and close string literals, the escape prefix inside literals, and the
//! continuation marker that decorates block-comment lines.
//!
//! Rule sets are looked up once per invocation by language tag through a
//! [`RuleRegistry`] and then passed by reference into
//! [`lexer::classify`](crate::lexer::classify) and
//! [`join::join_pair_with`](crate::join::join_pair_with). User config can
//! add new tags or override fields of a built-in set via `[languages.<tag>]`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use crate::config::schema::LanguageOverride;

/// Tag of the rule set used when no language is known.
pub const DEFAULT_LANGUAGE: &str = "default";

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

/// Opening and closing markers of a block comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockComment {
    pub open: String,
    pub close: String,
}

/// Marker set for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub name: String,
    /// Line-comment markers. When several match at one position the longest
    /// one wins, so `///` can be listed next to `//`.
    pub line_comments: Vec<String>,
    pub block_comment: Option<BlockComment>,
    /// Characters that open a literal; the same character closes it.
    pub string_delimiters: Vec<char>,
    /// Escape prefix inside literals. The escaped character never closes the
    /// literal.
    pub escape: Option<char>,
    /// Leading marker of block-comment continuation lines, stripped at the
    /// join point when followed by whitespace or end of line.
    pub continuation: Option<String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        default_rules().clone()
    }
}

impl RuleSet {
    /// Whether `c` opens a string literal in this language.
    pub fn is_delimiter(&self, c: char) -> bool {
        self.string_delimiters.contains(&c)
    }

    /// Longest line-comment marker that `text` starts with.
    pub fn line_comment_at(&self, text: &str) -> Option<&str> {
        self.line_comments
            .iter()
            .map(String::as_str)
            .filter(|marker| !marker.is_empty() && text.starts_with(marker))
            .max_by_key(|marker| marker.len())
    }

    /// Apply a config override on top of this rule set.
    ///
    /// Empty markers are dropped rather than kept: an empty marker would
    /// match at every position.
    pub fn apply_override(&mut self, name: &str, over: &LanguageOverride) {
        self.name = name.to_string();

        if let Some(markers) = &over.line_comments {
            self.line_comments = markers
                .iter()
                .filter(|m| !m.is_empty())
                .cloned()
                .collect();
        }
        if let Some(pair) = &over.block_comment {
            self.block_comment = match pair.as_slice() {
                [open, close] if !open.is_empty() && !close.is_empty() => Some(BlockComment {
                    open: open.clone(),
                    close: close.clone(),
                }),
                _ => None,
            };
        }
        if let Some(delims) = &over.string_delimiters {
            self.string_delimiters = delims.chars().collect();
        }
        if let Some(escape) = &over.escape {
            self.escape = escape.chars().next();
        }
        if let Some(marker) = &over.continuation {
            self.continuation = (!marker.is_empty()).then(|| marker.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in table
// ---------------------------------------------------------------------------

struct Builtin {
    name: &'static str,
    line_comments: &'static [&'static str],
    block_comment: Option<(&'static str, &'static str)>,
    string_delimiters: &'static str,
    escape: Option<char>,
    continuation: Option<&'static str>,
}

const C_FAMILY: Builtin = Builtin {
    name: DEFAULT_LANGUAGE,
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    string_delimiters: "'\"`",
    escape: Some('\\'),
    continuation: Some("*"),
};

const fn c_like(name: &'static str, string_delimiters: &'static str) -> Builtin {
    Builtin {
        name,
        string_delimiters,
        ..C_FAMILY
    }
}

const fn hash_comment(name: &'static str, escape: Option<char>) -> Builtin {
    Builtin {
        name,
        line_comments: &["#"],
        block_comment: None,
        string_delimiters: "'\"",
        escape,
        continuation: None,
    }
}

const BUILTINS: &[Builtin] = &[
    C_FAMILY,
    c_like("c", "'\""),
    c_like("cpp", "'\""),
    c_like("java", "'\""),
    c_like("csharp", "'\""),
    c_like("javascript", "'\"`"),
    c_like("typescript", "'\"`"),
    c_like("go", "'\"`"),
    c_like("kotlin", "'\""),
    c_like("swift", "\""),
    Builtin {
        name: "rust",
        line_comments: &["///", "//!", "//"],
        // `'` also marks lifetimes and labels, so only `"` opens a literal.
        string_delimiters: "\"",
        ..C_FAMILY
    },
    Builtin {
        name: "css",
        line_comments: &[],
        ..c_like("css", "'\"")
    },
    hash_comment("python", Some('\\')),
    hash_comment("shell", Some('\\')),
    hash_comment("ruby", Some('\\')),
    hash_comment("toml", Some('\\')),
    hash_comment("yaml", None),
    Builtin {
        name: "sql",
        line_comments: &["--"],
        block_comment: Some(("/*", "*/")),
        string_delimiters: "'\"",
        // Quotes are escaped by doubling, which the automaton already handles
        // as close-then-reopen.
        escape: None,
        continuation: Some("*"),
    },
    Builtin {
        name: "lua",
        line_comments: &["--"],
        block_comment: Some(("--[[", "]]")),
        string_delimiters: "'\"",
        escape: Some('\\'),
        continuation: None,
    },
];

const ALIASES: &[(&str, &str)] = &[
    ("c++", "cpp"),
    ("cc", "cpp"),
    ("cs", "csharp"),
    ("c#", "csharp"),
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("javascriptreact", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("typescriptreact", "typescript"),
    ("golang", "go"),
    ("kt", "kotlin"),
    ("rs", "rust"),
    ("py", "python"),
    ("sh", "shell"),
    ("bash", "shell"),
    ("zsh", "shell"),
    ("shellscript", "shell"),
    ("rb", "ruby"),
    ("yml", "yaml"),
    ("scss", "css"),
    ("less", "css"),
];

const EXTENSIONS: &[(&str, &str)] = &[
    ("c", "c"),
    ("h", "c"),
    ("cc", "cpp"),
    ("cpp", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("hh", "cpp"),
    ("java", "java"),
    ("cs", "csharp"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("mts", "typescript"),
    ("tsx", "typescript"),
    ("go", "go"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("swift", "swift"),
    ("rs", "rust"),
    ("css", "css"),
    ("scss", "css"),
    ("less", "css"),
    ("py", "python"),
    ("pyi", "python"),
    ("sh", "shell"),
    ("bash", "shell"),
    ("zsh", "shell"),
    ("rb", "ruby"),
    ("toml", "toml"),
    ("yml", "yaml"),
    ("yaml", "yaml"),
    ("sql", "sql"),
    ("lua", "lua"),
];

impl Builtin {
    fn to_rule_set(&self) -> RuleSet {
        RuleSet {
            name: self.name.to_string(),
            line_comments: self.line_comments.iter().map(|m| (*m).to_string()).collect(),
            block_comment: self.block_comment.map(|(open, close)| BlockComment {
                open: open.to_string(),
                close: close.to_string(),
            }),
            string_delimiters: self.string_delimiters.chars().collect(),
            escape: self.escape,
            continuation: self.continuation.map(str::to_string),
        }
    }
}

static DEFAULT_RULES: LazyLock<RuleSet> = LazyLock::new(|| C_FAMILY.to_rule_set());

/// The C-family rule set used when no language is selected.
pub fn default_rules() -> &'static RuleSet {
    &DEFAULT_RULES
}

/// Resolve aliases and casing to a canonical language tag.
pub fn canonical_tag(tag: &str) -> String {
    let lower = tag.trim().to_ascii_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or(lower)
}

/// Look up a built-in rule set by tag or alias.
pub fn builtin(tag: &str) -> Option<RuleSet> {
    let tag = canonical_tag(tag);
    BUILTINS
        .iter()
        .find(|b| b.name == tag)
        .map(Builtin::to_rule_set)
}

/// Names of all built-in rule sets, in table order.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|b| b.name)
}

/// Guess a language tag from a file path's extension.
pub fn language_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Built-in rule sets plus user overrides, keyed by canonical tag.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    overrides: BTreeMap<String, RuleSet>,
}

impl RuleRegistry {
    /// Registry with built-in rule sets only.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Build a registry from the `[languages]` config section.
    ///
    /// An override starts from its `extends` base, else from the built-in
    /// set of the same tag, else from the default rule set.
    pub fn from_overrides(languages: &BTreeMap<String, LanguageOverride>) -> Self {
        let overrides = languages
            .iter()
            .map(|(tag, over)| {
                let tag = canonical_tag(tag);
                let mut rules = over
                    .extends
                    .as_deref()
                    .and_then(builtin)
                    .or_else(|| builtin(&tag))
                    .unwrap_or_default();
                rules.apply_override(&tag, over);
                (tag, rules)
            })
            .collect();

        Self { overrides }
    }

    /// Resolve a tag to a rule set. Unknown tags fall back to the default
    /// set, including any `[languages.default]` override.
    pub fn resolve(&self, tag: &str) -> RuleSet {
        let tag = canonical_tag(tag);
        self.overrides
            .get(&tag)
            .cloned()
            .or_else(|| builtin(&tag))
            .or_else(|| self.overrides.get(DEFAULT_LANGUAGE).cloned())
            .unwrap_or_default()
    }

    /// Whether `tag` names a built-in or configured rule set.
    pub fn contains(&self, tag: &str) -> bool {
        let tag = canonical_tag(tag);
        self.overrides.contains_key(&tag) || builtin(&tag).is_some()
    }

    /// All known rule sets: built-ins (with overrides applied) followed by
    /// tags that only exist in config.
    pub fn all(&self) -> Vec<RuleSet> {
        let mut sets: Vec<RuleSet> = builtin_names().map(|name| self.resolve(name)).collect();
        sets.extend(
            self.overrides
                .iter()
                .filter(|(tag, _)| builtin(tag).is_none())
                .map(|(_, rules)| rules.clone()),
        );
        sets
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_are_c_family() {
        let rules = default_rules();
        assert_eq!(rules.name, DEFAULT_LANGUAGE);
        assert_eq!(rules.line_comments, vec!["//".to_string()]);
        assert_eq!(
            rules.block_comment,
            Some(BlockComment {
                open: "/*".to_string(),
                close: "*/".to_string()
            })
        );
        assert!(rules.is_delimiter('"'));
        assert!(rules.is_delimiter('\''));
        assert!(rules.is_delimiter('`'));
        assert_eq!(rules.escape, Some('\\'));
        assert_eq!(rules.continuation.as_deref(), Some("*"));
    }

    #[test]
    fn aliases_resolve_to_canonical_tags() {
        assert_eq!(canonical_tag("JS"), "javascript");
        assert_eq!(canonical_tag("rs"), "rust");
        assert_eq!(canonical_tag(" Bash "), "shell");
        assert_eq!(canonical_tag("unknown"), "unknown");
    }

    #[test]
    fn longest_line_comment_marker_wins() {
        let rust = builtin("rust").unwrap();
        assert_eq!(rust.line_comment_at("/// docs"), Some("///"));
        assert_eq!(rust.line_comment_at("//! inner"), Some("//!"));
        assert_eq!(rust.line_comment_at("// plain"), Some("//"));
        assert_eq!(rust.line_comment_at("/ nope"), None);
    }

    #[test]
    fn rust_does_not_treat_apostrophe_as_delimiter() {
        let rust = builtin("rust").unwrap();
        assert!(!rust.is_delimiter('\''));
        assert!(rust.is_delimiter('"'));
    }

    #[test]
    fn hash_comment_languages_have_no_block_comment() {
        let py = builtin("python").unwrap();
        assert_eq!(py.line_comments, vec!["#".to_string()]);
        assert!(py.block_comment.is_none());
        assert!(py.continuation.is_none());
    }

    #[test]
    fn css_only_has_block_comments() {
        let css = builtin("scss").unwrap();
        assert_eq!(css.name, "css");
        assert!(css.line_comments.is_empty());
        assert!(css.block_comment.is_some());
    }

    #[test]
    fn extension_detection() {
        assert_eq!(language_for_path(Path::new("src/main.rs")), Some("rust"));
        assert_eq!(language_for_path(Path::new("app.TSX")), Some("typescript"));
        assert_eq!(language_for_path(Path::new("script.py")), Some("python"));
        assert_eq!(language_for_path(Path::new("Makefile")), None);
    }

    #[test]
    fn unknown_tag_resolves_to_default() {
        let registry = RuleRegistry::builtin();
        assert_eq!(registry.resolve("brainfuck"), *default_rules());
        assert!(!registry.contains("brainfuck"));
        assert!(registry.contains("TS"));
    }

    #[test]
    fn unknown_tag_uses_configured_default_override() {
        let mut languages = BTreeMap::new();
        languages.insert(
            DEFAULT_LANGUAGE.to_string(),
            LanguageOverride {
                continuation: Some(String::new()),
                ..LanguageOverride::default()
            },
        );
        let registry = RuleRegistry::from_overrides(&languages);

        let unknown = registry.resolve("markdown");
        assert_eq!(unknown, registry.resolve(DEFAULT_LANGUAGE));
        assert!(unknown.continuation.is_none());
        // Known built-ins are not affected by the default override.
        assert_eq!(registry.resolve("c").continuation.as_deref(), Some("*"));
    }

    #[test]
    fn override_extends_builtin() {
        let mut languages = BTreeMap::new();
        languages.insert(
            "jsonc".to_string(),
            LanguageOverride {
                extends: Some("javascript".to_string()),
                string_delimiters: Some("\"".to_string()),
                ..LanguageOverride::default()
            },
        );
        let registry = RuleRegistry::from_overrides(&languages);
        let rules = registry.resolve("JSONC");
        assert_eq!(rules.name, "jsonc");
        assert_eq!(rules.string_delimiters, vec!['"']);
        assert_eq!(rules.line_comments, vec!["//".to_string()]);
        assert!(registry.contains("jsonc"));
        assert!(registry.all().iter().any(|r| r.name == "jsonc"));
    }

    #[test]
    fn override_without_extends_starts_from_same_tag() {
        let mut languages = BTreeMap::new();
        languages.insert(
            "python".to_string(),
            LanguageOverride {
                continuation: Some("#".to_string()),
                ..LanguageOverride::default()
            },
        );
        let registry = RuleRegistry::from_overrides(&languages);
        let rules = registry.resolve("py");
        assert_eq!(rules.line_comments, vec!["#".to_string()]);
        assert_eq!(rules.continuation.as_deref(), Some("#"));
    }

    #[test]
    fn override_drops_empty_markers() {
        let mut rules = RuleSet::default();
        rules.apply_override(
            "custom",
            &LanguageOverride {
                line_comments: Some(vec![String::new(), ";".to_string()]),
                block_comment: Some(vec!["(*".to_string()]),
                escape: Some(String::new()),
                continuation: Some(String::new()),
                ..LanguageOverride::default()
            },
        );
        assert_eq!(rules.line_comments, vec![";".to_string()]);
        assert!(rules.block_comment.is_none());
        assert!(rules.escape.is_none());
        assert!(rules.continuation.is_none());
    }
}
