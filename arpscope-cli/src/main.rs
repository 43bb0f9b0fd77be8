//! The arpscope binary
//!
//! Wires the pieces together: open a capture on the requested interface with
//! an ARP filter, decode frames on the capture thread, funnel decoded
//! announcements through a single-consumer channel into the binding monitor,
//! and run until Ctrl-C.

use arpscope_capture::{filters, list_capture_interfaces, PacketCapture};
use arpscope_cli::{paths, Cli, Commands};
use arpscope_core::{Error, Result};
use arpscope_monitor::{
    ArpMonitor, ConsoleSink, FanoutSink, FileSink, LineSink, TimestampSink,
};
use arpscope_packet::{ArpPacket, EthernetFrame};
use chrono::Local;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Decoded announcements waiting for the monitor
const CHANNEL_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("arpscope: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> Result<()> {
    if let Some(Commands::Interfaces) = cli.command {
        return print_interfaces();
    }

    cli.validate()?;
    let interface = cli
        .interface
        .clone()
        .ok_or_else(|| Error::config("no network interface specified, use --interface"))?;

    let mut monitor = ArpMonitor::new(cli.mode(), build_sink(&cli)?)?;

    let mut capture = PacketCapture::new(&interface)?;
    capture.set_filter(&filters::arp_filter())?;

    let (tx, mut rx) = mpsc::channel::<ArpPacket>(CHANNEL_CAPACITY);
    capture.start(move |packet| {
        let frame = match EthernetFrame::parse(packet.data()) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("skipping unparseable frame: {}", e);
                return;
            }
        };
        if !frame.is_arp() {
            return;
        }
        match ArpPacket::parse(&frame.payload) {
            Ok(announcement) => {
                if tx.blocking_send(announcement).is_err() {
                    debug!("announcement channel closed");
                }
            }
            Err(e) => debug!("skipping unparseable ARP packet: {}", e),
        }
    })?;

    println!("Waiting for incoming ARP packets...");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
            announcement = rx.recv() => match announcement {
                Some(packet) => {
                    if let Err(e) = monitor.observe(&packet) {
                        warn!("failed to record event: {}", e);
                    }
                }
                None => break,
            }
        }
    }

    capture.stop()?;
    monitor.flush()?;

    println!("{}", capture.stats().format());
    Ok(())
}

/// Build the composite sink the flags describe
///
/// When the log-file path cannot be constructed, fall back to console output
/// rather than dropping events on the floor.
fn build_sink(cli: &Cli) -> Result<Box<dyn LineSink>> {
    let mut console = cli.console;
    let mut destinations: Vec<Box<dyn LineSink>> = Vec::new();

    if cli.log_file {
        let path = match &cli.output {
            Some(path) => Some(path.clone()),
            None => match paths::default_log_path(Local::now()) {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Can't create log file: {}. Default printing to console.", e);
                    console = true;
                    None
                }
            },
        };
        if let Some(path) = path {
            let sink = FileSink::create(&path)?;
            println!("Saving to log file: {}", path.display());
            destinations.push(Box::new(sink));
        }
    }
    if console {
        destinations.push(Box::new(ConsoleSink::new()));
    }

    Ok(Box::new(TimestampSink::new(Box::new(FanoutSink::new(
        destinations,
    )))))
}

fn print_interfaces() -> Result<()> {
    let interfaces = list_capture_interfaces()?;

    for iface in &interfaces {
        print!("{}", iface.name);
        if let Some(ref mac) = iface.mac {
            print!("  {}", mac);
        }
        if let Some(ip) = iface.primary_ipv4() {
            print!("  {}", ip);
        }
        println!();
    }

    Ok(())
}
