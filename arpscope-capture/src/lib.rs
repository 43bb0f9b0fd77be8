//! Packet capture library for arpscope
//!
//! A type-safe wrapper around pcap, scoped to what an ARP watcher needs:
//! open one interface, apply a BPF filter, and hand every captured frame to
//! a callback on a dedicated capture thread.
//!
//! ## Example
//!
//! ```no_run
//! use arpscope_capture::{filters, PacketCapture};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut capture = PacketCapture::new("eth0")?;
//! capture.set_filter(&filters::arp_filter())?;
//!
//! capture.start(|packet| {
//!     println!("Got packet: {} bytes", packet.len());
//! })?;
//!
//! // Later, stop the capture
//! capture.stop()?;
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod filters;
pub mod interface;
pub mod stats;

pub use capture::{CaptureConfig, CaptureState, PacketCapture};
pub use interface::{
    default_interface, get_interface, list_capture_interfaces, list_interfaces, InterfaceInfo,
};
pub use stats::{CaptureStats, StatsAccumulator};
