//! Core types for arpscope
//!
//! This crate provides the shared error type, hardware address type, and
//! captured-packet type used by the other arpscope crates.

pub mod error;
pub mod packet;
pub mod types;

pub use error::{Error, Result};
pub use packet::Packet;
pub use types::MacAddr;
