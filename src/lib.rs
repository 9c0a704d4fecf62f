pub mod adapter;
pub mod analytics;
pub mod cli;
pub mod config;
pub mod join;
pub mod lexer;
pub mod rules;
