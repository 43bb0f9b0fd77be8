//! Ethernet II frame parsing and construction

use arpscope_core::{Error, MacAddr, Result};
use bytes::{BufMut, BytesMut};
use std::fmt;

/// EtherType values relevant to ARP watching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtherType {
    /// IPv4 (0x0800)
    IPv4,
    /// ARP (0x0806)
    Arp,
    /// RARP (0x8035)
    Rarp,
    /// VLAN-tagged frame (0x8100)
    Vlan,
    /// IPv6 (0x86DD)
    IPv6,
    /// Any other EtherType
    Other(u16),
}

impl EtherType {
    /// Convert EtherType to u16 value
    pub fn to_u16(self) -> u16 {
        match self {
            EtherType::IPv4 => 0x0800,
            EtherType::Arp => 0x0806,
            EtherType::Rarp => 0x8035,
            EtherType::Vlan => 0x8100,
            EtherType::IPv6 => 0x86DD,
            EtherType::Other(val) => val,
        }
    }

    /// Create EtherType from u16 value
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x0800 => EtherType::IPv4,
            0x0806 => EtherType::Arp,
            0x8035 => EtherType::Rarp,
            0x8100 => EtherType::Vlan,
            0x86DD => EtherType::IPv6,
            val => EtherType::Other(val),
        }
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtherType::IPv4 => write!(f, "IPv4"),
            EtherType::Arp => write!(f, "ARP"),
            EtherType::Rarp => write!(f, "RARP"),
            EtherType::Vlan => write!(f, "VLAN"),
            EtherType::IPv6 => write!(f, "IPv6"),
            EtherType::Other(val) => write!(f, "0x{:04X}", val),
        }
    }
}

/// Ethernet II frame
#[derive(Debug, Clone)]
pub struct EthernetFrame {
    /// Destination MAC address
    pub destination: MacAddr,
    /// Source MAC address
    pub source: MacAddr,
    /// EtherType field
    pub ethertype: EtherType,
    /// Payload data
    pub payload: Vec<u8>,
}

impl EthernetFrame {
    /// Ethernet header size (dst + src + type)
    pub const HEADER_SIZE: usize = 14;

    /// Minimum Ethernet frame size (without FCS)
    pub const MIN_FRAME_SIZE: usize = 60;

    /// Create a new Ethernet frame
    pub fn new(
        destination: MacAddr,
        source: MacAddr,
        ethertype: EtherType,
        payload: Vec<u8>,
    ) -> Self {
        EthernetFrame {
            destination,
            source,
            ethertype,
            payload,
        }
    }

    /// Parse an Ethernet frame from bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::HEADER_SIZE {
            return Err(Error::parsing(format!(
                "Ethernet frame too short: {} bytes",
                data.len()
            )));
        }

        // header length was checked, both slices are 6 bytes
        let destination = MacAddr::from_slice(&data[0..6])
            .ok_or_else(|| Error::parsing("Invalid destination MAC"))?;
        let source =
            MacAddr::from_slice(&data[6..12]).ok_or_else(|| Error::parsing("Invalid source MAC"))?;

        let ethertype = EtherType::from_u16(u16::from_be_bytes([data[12], data[13]]));
        let payload = data[Self::HEADER_SIZE..].to_vec();

        Ok(EthernetFrame {
            destination,
            source,
            ethertype,
            payload,
        })
    }

    /// Convert the frame to bytes, padded to the minimum frame size
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = BytesMut::with_capacity(Self::HEADER_SIZE + self.payload.len());

        buffer.put_slice(self.destination.as_bytes());
        buffer.put_slice(self.source.as_bytes());
        buffer.put_u16(self.ethertype.to_u16());
        buffer.put_slice(&self.payload);

        let mut result = buffer.to_vec();
        if result.len() < Self::MIN_FRAME_SIZE {
            result.resize(Self::MIN_FRAME_SIZE, 0);
        }

        result
    }

    /// Check whether the frame carries an ARP payload
    pub fn is_arp(&self) -> bool {
        self.ethertype == EtherType::Arp
    }
}
