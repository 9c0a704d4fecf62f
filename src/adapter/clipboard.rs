//! Clipboard output for `joinctx copy`.
//!
//! [`ClipboardProvider`] is the write-only interface the adapter needs.
//! [`CommandClipboard`] implements it by piping text into the platform's
//! clipboard command (`pbcopy`, `wl-copy`, `xclip`, ...), detected from the
//! environment or forced through `[clipboard].provider`.

use std::borrow::Cow;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use anyhow::{Context, Result};

use crate::config::schema::ClipboardConfig;

pub trait ClipboardProvider {
    fn name(&self) -> Cow<'_, str>;
    fn set_contents(&self, content: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Command-based provider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClipboard {
    Pasteboard,
    Wayland,
    XClip,
    XSel,
    Termux,
    Tmux,
    Win32Yank,
    None,
}

const PROVIDER_NAMES: &[(&str, CommandClipboard)] = &[
    ("pasteboard", CommandClipboard::Pasteboard),
    ("wayland", CommandClipboard::Wayland),
    ("xclip", CommandClipboard::XClip),
    ("xsel", CommandClipboard::XSel),
    ("termux", CommandClipboard::Termux),
    ("tmux", CommandClipboard::Tmux),
    ("win32yank", CommandClipboard::Win32Yank),
    ("none", CommandClipboard::None),
];

impl CommandClipboard {
    /// Pick the first clipboard command available in this environment.
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            if env_var_is_set("TMUX") && binary_exists("tmux") {
                return Self::Tmux;
            }
            if binary_exists("pbcopy") {
                return Self::Pasteboard;
            }
            return Self::None;
        }

        if env_var_is_set("WAYLAND_DISPLAY") && binary_exists("wl-copy") {
            Self::Wayland
        } else if env_var_is_set("DISPLAY") && binary_exists("xclip") {
            Self::XClip
        } else if env_var_is_set("DISPLAY") && binary_exists("xsel") {
            Self::XSel
        } else if binary_exists("termux-clipboard-set") {
            Self::Termux
        } else if env_var_is_set("TMUX") && binary_exists("tmux") {
            Self::Tmux
        } else if binary_exists("win32yank.exe") {
            Self::Win32Yank
        } else {
            Self::None
        }
    }

    /// Look up a provider by config name. `auto` runs detection.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        if name == "auto" {
            return Some(Self::detect());
        }
        PROVIDER_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, provider)| *provider)
    }

    pub fn from_config(config: &ClipboardConfig) -> Result<Self> {
        Self::from_name(&config.provider)
            .with_context(|| format!("unknown clipboard provider '{}'", config.provider))
    }

    /// Config name of this provider.
    pub fn config_name(&self) -> &'static str {
        PROVIDER_NAMES
            .iter()
            .find(|(_, p)| p == self)
            .map(|(n, _)| *n)
            .unwrap_or("none")
    }

    /// Program and arguments that read the clipboard contents from stdin.
    pub fn command(&self) -> Option<(&'static str, &'static [&'static str])> {
        self.program().map(|program| (program, self.args()))
    }

    fn program(&self) -> Option<&'static str> {
        match self {
            Self::Pasteboard => Some("pbcopy"),
            Self::Wayland => Some("wl-copy"),
            Self::XClip => Some("xclip"),
            Self::XSel => Some("xsel"),
            Self::Termux => Some("termux-clipboard-set"),
            Self::Tmux => Some("tmux"),
            Self::Win32Yank => Some("win32yank.exe"),
            Self::None => None,
        }
    }

    fn args(&self) -> &'static [&'static str] {
        match self {
            Self::Wayland => &["--type", "text/plain"],
            Self::XClip => &["-i", "-selection", "clipboard"],
            Self::XSel => &["-i", "-b"],
            Self::Tmux => &["load-buffer", "-w", "-"],
            Self::Win32Yank => &["-i", "--crlf"],
            Self::Pasteboard | Self::Termux | Self::None => &[],
        }
    }
}

impl ClipboardProvider for CommandClipboard {
    fn name(&self) -> Cow<'_, str> {
        match self.command() {
            Some((program, _)) => format!("{} ({program})", self.config_name()).into(),
            None => "none".into(),
        }
    }

    fn set_contents(&self, content: &str) -> Result<()> {
        let Some((program, args)) = self.command() else {
            anyhow::bail!("no clipboard provider available; set [clipboard].provider");
        };
        pipe_to_command(program, args, content)
    }
}

fn pipe_to_command(program: &str, args: &[&str], input: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to start clipboard command: {program}"))?;

    child
        .stdin
        .take()
        .context("clipboard command has no stdin")?
        .write_all(input.as_bytes())
        .with_context(|| format!("failed writing to {program}"))?;

    let status = child
        .wait()
        .with_context(|| format!("failed waiting for {program}"))?;
    if !status.success() {
        anyhow::bail!("clipboard command {program} exited with {status}");
    }

    Ok(())
}

fn binary_exists(name: &str) -> bool {
    which::which(name).is_ok()
}

fn env_var_is_set(name: &str) -> bool {
    std::env::var_os(name).is_some_and(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// In-memory provider
// ---------------------------------------------------------------------------

/// Clipboard that keeps every write in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// The most recent write.
    pub fn contents(&self) -> Option<String> {
        self.writes().pop()
    }
}

impl ClipboardProvider for MemoryClipboard {
    fn name(&self) -> Cow<'_, str> {
        "memory".into()
    }

    fn set_contents(&self, content: &str) -> Result<()> {
        self.writes
            .lock()
            .map_err(|_| anyhow::anyhow!("memory clipboard lock poisoned"))?
            .push(content.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
