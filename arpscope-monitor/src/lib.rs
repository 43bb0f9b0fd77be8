//! Binding tracking and classification for arpscope
//!
//! This crate holds the live view of IPv4 <-> MAC bindings and decides what
//! each decoded ARP announcement means:
//!
//! - a brand-new binding (`[NEW MAPPING]`),
//! - a changed or migrated binding (`[CHANGE MAPPING]`),
//! - a malformed announcement (`[WARNING]`),
//! - or a no-op repeat of an already-known binding (nothing emitted).
//!
//! Event lines are handed to an injected [`LineSink`]; the monitor performs
//! no I/O of its own beyond that. Classification is synchronous and
//! single-consumer: feed announcements one at a time, in arrival order.
//!
//! ## Example
//!
//! ```
//! use arpscope_core::MacAddr;
//! use arpscope_monitor::{ArpMonitor, MemorySink, MonitorMode};
//! use arpscope_packet::ArpPacket;
//! use std::net::Ipv4Addr;
//!
//! # fn main() -> arpscope_core::Result<()> {
//! let sink = MemorySink::new();
//! let lines = sink.handle();
//!
//! let mode = MonitorMode {
//!     dump_all: false,
//!     report_changes: true,
//! };
//! let mut monitor = ArpMonitor::new(mode, Box::new(sink))?;
//!
//! let announcement = ArpPacket::new_gratuitous(
//!     MacAddr::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
//!     Ipv4Addr::new(192, 168, 1, 10),
//! );
//! monitor.observe(&announcement)?;
//!
//! assert_eq!(
//!     *lines.lock(),
//!     vec!["[NEW MAPPING] 192.168.1.10 <-> 00:11:22:33:44:55"]
//! );
//! # Ok(())
//! # }
//! ```

pub mod mode;
pub mod monitor;
pub mod sink;
pub mod table;

pub use mode::MonitorMode;
pub use monitor::ArpMonitor;
pub use sink::{ConsoleSink, FanoutSink, FileSink, LineSink, MemorySink, TimestampSink};
pub use table::BindingTable;
