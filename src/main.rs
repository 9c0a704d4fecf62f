use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use joinctx::cli;

#[derive(Debug, Parser)]
#[command(name = "joinctx")]
#[command(about = "Context-aware line joining for code, comments and string literals")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Join lines of FILE (or stdin); every line when no --lines is given
    Join {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,
        /// 1-based line selection, N or N:M. Repeatable
        #[arg(short, long = "lines", value_name = "N[:M]")]
        lines: Vec<String>,
        /// Language rule set (overrides config and file extension)
        #[arg(long)]
        language: Option<String>,
        /// Rewrite FILE instead of printing the joined lines
        #[arg(short, long)]
        in_place: bool,
        /// Output format: text (default), json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Join the selected lines and copy the result to the clipboard
    Copy {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,
        /// 1-based line selection, N or N:M. Repeatable
        #[arg(short, long = "lines", value_name = "N[:M]", required = true)]
        lines: Vec<String>,
        /// Language rule set (overrides config and file extension)
        #[arg(long)]
        language: Option<String>,
        /// Also print the joined text
        #[arg(long)]
        print: bool,
    },
    /// Show the join context at the end of TEXT (or stdin)
    Classify {
        /// Text to classify; reads stdin when omitted
        text: Option<String>,
        /// Language rule set
        #[arg(long)]
        language: Option<String>,
        /// Also list the regions the text was split into
        #[arg(long)]
        spans: bool,
        /// Output format: text (default), json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List built-in and configured language rule sets
    Languages {
        /// Output format: text (default), json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show statistics from the event log
    Stats {
        /// Output format: text (default), json
        #[arg(long, default_value = "text")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Check config, clipboard and event log
    Health,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default ~/.joinctx/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. general.language rust
    Set { key: String, value: String },
    /// Restore ~/.joinctx/config.toml to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Join {
            file,
            lines,
            language,
            in_place,
            format,
        } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_join(file.as_deref(), &lines, language.as_deref(), in_place, fmt)
        }
        Commands::Copy {
            file,
            lines,
            language,
            print,
        } => cli::run_copy(file.as_deref(), &lines, language.as_deref(), print),
        Commands::Classify {
            text,
            language,
            spans,
            format,
        } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_classify(text.as_deref(), language.as_deref(), spans, fmt)
        }
        Commands::Languages { format } => {
            cli::run_languages(cli::OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Stats { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(fmt, days)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
        Commands::Health => cli::run_health(),
    }
}
