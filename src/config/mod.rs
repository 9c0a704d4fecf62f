/// Configuration system for joinctx.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: [`schema::JoinctxConfig::default()`]
/// 2. **User global config**: `~/.joinctx/config.toml`
/// 3. **Project local config**: `.joinctx.toml` in the current working directory
/// 4. **Environment variables**: `JOINCTX_*` overrides (highest precedence)
///
/// File layers are merged at the TOML table level, so a file only needs the
/// keys it changes. A layer that fails to parse, or that would make the
/// merged config invalid, is skipped: a broken config file never stops a
/// join.
///
/// # Usage
///
/// ```rust,ignore
/// use joinctx::config;
///
/// let cfg = config::load();
/// if cfg.general.skip_last_line {
///     // ...
/// }
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::JoinctxConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved joinctx configuration.
///
/// Merges defaults → global TOML → project TOML → env vars.
pub fn load() -> JoinctxConfig {
    let mut config = load_layers(&[global_config_path(), project_config_path()]);
    apply_env_overrides(&mut config);
    config
}

/// Merge the given TOML files (lowest precedence first) over the defaults.
pub fn load_layers(paths: &[Option<PathBuf>]) -> JoinctxConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in paths.iter().flatten() {
        let Some(layer) = load_toml_value(path) else {
            continue;
        };

        let mut candidate = merged.clone();
        merge_values(&mut candidate, layer);
        if candidate.clone().try_into::<JoinctxConfig>().is_ok() {
            merged = candidate;
        }
    }

    merged.try_into().unwrap_or_default()
}

/// Read a TOML file as an untyped value. Missing or malformed files yield
/// `None`.
fn load_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Recursively merge `overlay` into `base`. Tables merge key by key; any
/// other value in the overlay replaces the base value.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.joinctx/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".joinctx").join("config.toml"))
}

/// Path to the project local config: `.joinctx.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".joinctx.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    if path == "~" {
        return dirs::home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `JOINCTX_LANGUAGE`: default language tag
/// - `JOINCTX_CONTINUATION`: continuation marker for the default rule set
/// - `JOINCTX_SKIP_LAST_LINE`: last-line policy (`1`/`true`/`yes`/`on`)
/// - `JOINCTX_CLIPBOARD`: clipboard provider name
/// - `JOINCTX_LOG`: event log enabled
/// - `JOINCTX_LOG_PATH`: event log path
fn apply_env_overrides(config: &mut JoinctxConfig) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary variable source.
pub fn apply_overrides_from(config: &mut JoinctxConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("JOINCTX_LANGUAGE")
        && !val.is_empty()
    {
        config.general.language = val;
    }
    if let Some(val) = var("JOINCTX_CONTINUATION") {
        config
            .languages
            .entry(crate::rules::DEFAULT_LANGUAGE.to_string())
            .or_default()
            .continuation = Some(val);
    }
    if let Some(val) = var("JOINCTX_SKIP_LAST_LINE") {
        config.general.skip_last_line = is_truthy(&val);
    }
    if let Some(val) = var("JOINCTX_CLIPBOARD")
        && !val.is_empty()
    {
        config.clipboard.provider = val.to_ascii_lowercase();
    }
    if let Some(val) = var("JOINCTX_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Some(val) = var("JOINCTX_LOG_PATH")
        && !val.is_empty()
    {
        config.logging.path = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.joinctx/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    write_default_config(&path, force)?;
    Ok(path)
}

/// Write the annotated defaults to `path`.
pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }

    fs::write(path, JoinctxConfig::default_toml()).context("failed to write config file")
}

/// Set a single config key to a value in the global config file.
///
/// Supports dotted keys like `general.language` or
/// `languages.rust.continuation`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_in(&path, key, value)
}

/// Set a dotted key in the config file at `path`, creating it from the
/// defaults when it does not exist yet.
pub fn set_config_value_in(path: &Path, key: &str, value: &str) -> Result<()> {
    let content = if path.exists() {
        fs::read_to_string(path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&JoinctxConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;

    set_toml_value(&mut root, key, value)?;

    root.clone()
        .try_into::<JoinctxConfig>()
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")?;

    Ok(())
}

/// Keys under `languages.<tag>` that hold arrays.
const ARRAY_LANGUAGE_KEYS: &[&str] = &["line_comments", "block_comment"];

/// Set a value in a TOML value tree using a dotted key path.
///
/// Missing tables are only created below `languages`, where new tags are
/// expected; anywhere else an unknown section is an error.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("invalid config key: '{key}'");
    }

    let in_languages = parts[0] == "languages";
    if in_languages && parts.len() != 3 {
        anyhow::bail!("language keys have the form languages.<tag>.<field>, got '{key}'");
    }

    // Navigate to the parent table
    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        let table = current
            .as_table_mut()
            .with_context(|| format!("expected table while resolving '{key}'"))?;
        if in_languages && !table.contains_key(part) {
            table.insert(part.to_string(), toml::Value::Table(toml::map::Map::new()));
        }
        current = table
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    if !in_languages && !table.contains_key(leaf) {
        anyhow::bail!("config key not found: '{key}'");
    }

    // Parse according to the type of the existing value
    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Array(_)) => comma_list(raw_value),
        None if ARRAY_LANGUAGE_KEYS.contains(&leaf) => comma_list(raw_value),
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Parse a comma-separated list into a TOML string array.
fn comma_list(raw: &str) -> toml::Value {
    toml::Value::Array(
        raw.split(',')
            .map(|s| toml::Value::String(s.trim().to_string()))
            .filter(|v| v.as_str().is_some_and(|s| !s.is_empty()))
            .collect(),
    )
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
