//! CLI module for syncsched - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for one-off evaluations,
//! simulated scheduler runs and stats maintenance.

pub mod commands;

pub use commands::Cli;
