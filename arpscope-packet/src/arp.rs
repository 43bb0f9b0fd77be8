//! ARP packet parsing and construction

use arpscope_core::{Error, MacAddr, Result};
use bytes::{BufMut, BytesMut};
use std::fmt;
use std::net::Ipv4Addr;

/// Hardware types
pub const HTYPE_ETHERNET: u16 = 1;

/// Protocol types
pub const PTYPE_IPV4: u16 = 0x0800;

/// Fixed part of the ARP header (htype, ptype, hlen, plen, oper)
const FIXED_HEADER_LEN: usize = 8;

/// ARP Operation Codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOpcode {
    /// ARP Request
    Request = 1,
    /// ARP Reply
    Reply = 2,
    /// RARP Request
    RarpRequest = 3,
    /// RARP Reply
    RarpReply = 4,
}

impl ArpOpcode {
    pub fn from_u16(val: u16) -> Option<Self> {
        match val {
            1 => Some(Self::Request),
            2 => Some(Self::Reply),
            3 => Some(Self::RarpRequest),
            4 => Some(Self::RarpReply),
            _ => None,
        }
    }
}

impl fmt::Display for ArpOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArpOpcode::Request => write!(f, "Request"),
            ArpOpcode::Reply => write!(f, "Reply"),
            ArpOpcode::RarpRequest => write!(f, "RARP Request"),
            ArpOpcode::RarpReply => write!(f, "RARP Reply"),
        }
    }
}

/// ARP packet
///
/// Sender/target addresses are stored exactly as carried on the wire, sized
/// by the header's `hlen`/`plen` fields. Announcements that do not use
/// 6-byte hardware or 4-byte protocol addresses therefore parse fine; the
/// binding monitor rejects them during its own validation so the rejection
/// shows up in the event stream.
#[derive(Debug, Clone)]
pub struct ArpPacket {
    /// Hardware type (typically 1 for Ethernet)
    pub htype: u16,
    /// Protocol type (typically 0x0800 for IPv4)
    pub ptype: u16,
    /// Hardware address length (6 for MAC)
    pub hlen: u8,
    /// Protocol address length (4 for IPv4)
    pub plen: u8,
    /// Operation
    pub operation: ArpOpcode,
    /// Sender hardware address
    pub sender_hw: Vec<u8>,
    /// Sender protocol address
    pub sender_proto: Vec<u8>,
    /// Target hardware address
    pub target_hw: Vec<u8>,
    /// Target protocol address
    pub target_proto: Vec<u8>,
}

impl ArpPacket {
    /// Create new ARP request
    pub fn new_request(sender_mac: MacAddr, sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Self {
        Self {
            htype: HTYPE_ETHERNET,
            ptype: PTYPE_IPV4,
            hlen: 6,
            plen: 4,
            operation: ArpOpcode::Request,
            sender_hw: sender_mac.as_bytes().to_vec(),
            sender_proto: sender_ip.octets().to_vec(),
            target_hw: MacAddr::zero().as_bytes().to_vec(), // unknown in request
            target_proto: target_ip.octets().to_vec(),
        }
    }

    /// Create new ARP reply
    pub fn new_reply(
        sender_mac: MacAddr,
        sender_ip: Ipv4Addr,
        target_mac: MacAddr,
        target_ip: Ipv4Addr,
    ) -> Self {
        Self {
            htype: HTYPE_ETHERNET,
            ptype: PTYPE_IPV4,
            hlen: 6,
            plen: 4,
            operation: ArpOpcode::Reply,
            sender_hw: sender_mac.as_bytes().to_vec(),
            sender_proto: sender_ip.octets().to_vec(),
            target_hw: target_mac.as_bytes().to_vec(),
            target_proto: target_ip.octets().to_vec(),
        }
    }

    /// Create gratuitous ARP (announcement)
    pub fn new_gratuitous(mac: MacAddr, ip: Ipv4Addr) -> Self {
        Self {
            htype: HTYPE_ETHERNET,
            ptype: PTYPE_IPV4,
            hlen: 6,
            plen: 4,
            operation: ArpOpcode::Request,
            sender_hw: mac.as_bytes().to_vec(),
            sender_proto: ip.octets().to_vec(),
            target_hw: MacAddr::zero().as_bytes().to_vec(),
            target_proto: ip.octets().to_vec(), // same as sender
        }
    }

    /// Parse ARP packet from bytes
    ///
    /// Address fields are sliced according to the header's `hlen`/`plen`, the
    /// way the wire format defines them, not assumed to be 6/4 bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < FIXED_HEADER_LEN {
            return Err(Error::parsing("ARP packet too short"));
        }

        let htype = u16::from_be_bytes([data[0], data[1]]);
        let ptype = u16::from_be_bytes([data[2], data[3]]);
        let hlen = data[4];
        let plen = data[5];
        let op_val = u16::from_be_bytes([data[6], data[7]]);

        let operation =
            ArpOpcode::from_u16(op_val).ok_or_else(|| Error::parsing("Invalid ARP opcode"))?;

        let addr_len = 2 * (hlen as usize + plen as usize);
        if data.len() < FIXED_HEADER_LEN + addr_len {
            return Err(Error::parsing(format!(
                "ARP packet truncated: {} bytes, addresses need {}",
                data.len(),
                FIXED_HEADER_LEN + addr_len
            )));
        }

        let mut offset = FIXED_HEADER_LEN;
        let mut take = |len: usize| {
            let field = data[offset..offset + len].to_vec();
            offset += len;
            field
        };

        let sender_hw = take(hlen as usize);
        let sender_proto = take(plen as usize);
        let target_hw = take(hlen as usize);
        let target_proto = take(plen as usize);

        Ok(Self {
            htype,
            ptype,
            hlen,
            plen,
            operation,
            sender_hw,
            sender_proto,
            target_hw,
            target_proto,
        })
    }

    /// Serialize ARP packet to bytes
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(
            FIXED_HEADER_LEN + 2 * (self.sender_hw.len() + self.sender_proto.len()),
        );

        buf.put_u16(self.htype);
        buf.put_u16(self.ptype);
        buf.put_u8(self.hlen);
        buf.put_u8(self.plen);
        buf.put_u16(self.operation as u16);
        buf.put_slice(&self.sender_hw);
        buf.put_slice(&self.sender_proto);
        buf.put_slice(&self.target_hw);
        buf.put_slice(&self.target_proto);

        buf.to_vec()
    }

    /// Sender MAC address, if the hardware address is 6 bytes
    pub fn sender_mac(&self) -> Option<MacAddr> {
        MacAddr::from_slice(&self.sender_hw)
    }

    /// Sender IPv4 address, if the protocol address is 4 bytes
    pub fn sender_ipv4(&self) -> Option<Ipv4Addr> {
        let octets: [u8; 4] = self.sender_proto.as_slice().try_into().ok()?;
        Some(Ipv4Addr::from(octets))
    }

    /// Target MAC address, if the hardware address is 6 bytes
    pub fn target_mac(&self) -> Option<MacAddr> {
        MacAddr::from_slice(&self.target_hw)
    }

    /// Target IPv4 address, if the protocol address is 4 bytes
    pub fn target_ipv4(&self) -> Option<Ipv4Addr> {
        let octets: [u8; 4] = self.target_proto.as_slice().try_into().ok()?;
        Some(Ipv4Addr::from(octets))
    }

    /// Check if this is a request
    pub fn is_request(&self) -> bool {
        self.operation == ArpOpcode::Request
    }

    /// Check if this is a reply
    pub fn is_reply(&self) -> bool {
        self.operation == ArpOpcode::Reply
    }

    /// Check if this is gratuitous ARP
    pub fn is_gratuitous(&self) -> bool {
        self.sender_proto == self.target_proto
    }
}
