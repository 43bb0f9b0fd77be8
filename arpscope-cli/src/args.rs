//! CLI argument parsing

use arpscope_core::{Error, Result};
use arpscope_monitor::MonitorMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "arpscope")]
#[command(version, about = "Passive ARP activity logger", long_about = None)]
pub struct Cli {
    /// Network interface to listen for ARP packets
    #[arg(short = 'i', long)]
    pub interface: Option<String>,

    /// Print events to the console
    #[arg(short = 'c', long)]
    pub console: bool,

    /// Store events to a log file
    #[arg(short = 'l', long)]
    pub log_file: bool,

    /// Log file path, overriding the generated one
    #[arg(short = 'o', long, value_name = "PATH", requires = "log_file")]
    pub output: Option<PathBuf>,

    /// Dump all ARP traffic
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Report only new and changed IP <-> MAC mappings
    #[arg(short = 'n', long)]
    pub new: bool,

    /// Verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available network interfaces
    Interfaces,
}

impl Cli {
    /// Check the construction contract before any capture starts
    ///
    /// Watching needs at least one output destination, at least one logging
    /// mode, and an interface to listen on.
    pub fn validate(&self) -> Result<()> {
        if !self.console && !self.log_file {
            return Err(Error::config(
                "no output destination specified, use --console and/or --log-file",
            ));
        }
        if !self.all && !self.new {
            return Err(Error::config(
                "no logging mode specified, use --all and/or --new",
            ));
        }
        if self.interface.is_none() {
            return Err(Error::config(
                "no network interface specified, use --interface",
            ));
        }
        Ok(())
    }

    /// Monitor mode the flags describe
    pub fn mode(&self) -> MonitorMode {
        MonitorMode {
            dump_all: self.all,
            report_changes: self.new,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("arpscope").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_full_invocation_validates() {
        let cli = parse(&["--interface", "eth0", "--console", "--new"]);
        assert!(cli.validate().is_ok());
        assert!(cli.mode().report_changes);
        assert!(!cli.mode().dump_all);
    }

    #[test]
    fn test_missing_destination_is_config_error() {
        let cli = parse(&["--interface", "eth0", "--new"]);
        assert!(matches!(cli.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_mode_is_config_error() {
        let cli = parse(&["--interface", "eth0", "--console"]);
        assert!(matches!(cli.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_interface_is_config_error() {
        let cli = parse(&["--console", "--all"]);
        assert!(matches!(cli.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_output_requires_log_file() {
        let result = Cli::try_parse_from(["arpscope", "-i", "eth0", "-c", "-n", "-o", "/tmp/x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_short_flags() {
        let cli = parse(&["-i", "en0", "-c", "-l", "-a", "-n", "-vv"]);
        assert!(cli.validate().is_ok());
        assert!(cli.console);
        assert!(cli.log_file);
        assert!(cli.mode().dump_all);
        assert!(cli.mode().report_changes);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_interfaces_subcommand() {
        let cli = parse(&["interfaces"]);
        assert!(matches!(cli.command, Some(Commands::Interfaces)));
    }
}
