//! CLI interface for arpscope
//!
//! This crate provides the command-line interface for arpscope: argument
//! parsing and log-file path construction.

pub mod args;
pub mod paths;

pub use args::{Cli, Commands};
