//! Optional JSONL event log of CLI runs and its reporter.

pub mod logger;
pub mod reporter;
