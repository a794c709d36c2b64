//! CLI module for studyplan - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for importing terms,
//! scheduling them and inspecting the generated sessions.

pub mod commands;

pub use commands::Cli;
