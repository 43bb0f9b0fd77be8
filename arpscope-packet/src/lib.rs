//! Frame and ARP parsing for arpscope
//!
//! This crate decodes captured Ethernet II frames and the ARP messages they
//! carry into structured records for the binding monitor:
//!
//! - [`ethernet`] - Ethernet II frame parsing and construction
//! - [`arp`] - ARP packet parsing and construction
//!
//! ARP sender/target addresses are kept as raw byte vectors sized by the
//! header's length fields, so announcements with unexpected address sizes
//! survive decoding and can be rejected (and reported) by the monitor's own
//! validation instead of disappearing at the parsing layer.

pub mod arp;
pub mod ethernet;

pub use arp::{ArpOpcode, ArpPacket};
pub use ethernet::{EtherType, EthernetFrame};
