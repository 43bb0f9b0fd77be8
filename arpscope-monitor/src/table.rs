//! The binding table: current ground truth of IPv4 <-> MAC associations

use arpscope_core::MacAddr;
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// Current mapping from IPv4 address to hardware address
///
/// At most one MAC is associated with any given IP at a time. The update
/// algorithm in [`crate::ArpMonitor`] additionally keeps the table free of
/// stale reverse mappings: when a MAC migrates to a new IP, its entry under
/// the old IP is removed in the same logical update. The table itself does
/// not enforce that second invariant.
///
/// Size is bounded by the number of distinct active hosts on one broadcast
/// domain, so the linear reverse scan in [`find_by_mac`](Self::find_by_mac)
/// is not a hot path relative to I/O cost.
#[derive(Debug, Default)]
pub struct BindingTable {
    entries: HashMap<Ipv4Addr, MacAddr>,
}

impl BindingTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Look up the MAC currently bound to an IP
    pub fn lookup(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        self.entries.get(&ip).copied()
    }

    /// Insert or overwrite a binding
    pub fn insert(&mut self, ip: Ipv4Addr, mac: MacAddr) {
        self.entries.insert(ip, mac);
    }

    /// Remove a binding, returning the previous MAC if one was present
    pub fn remove(&mut self, ip: Ipv4Addr) -> Option<MacAddr> {
        self.entries.remove(&ip)
    }

    /// All IPs currently bound to the given MAC
    ///
    /// Linear scan; iteration order is unspecified. With the reverse-mapping
    /// invariant intact the result holds at most one entry, so more than one
    /// signals table corruption and callers are expected to complain loudly.
    pub fn find_by_mac(&self, mac: MacAddr) -> Vec<Ipv4Addr> {
        self.entries
            .iter()
            .filter(|(_, v)| **v == mac)
            .map(|(k, _)| *k)
            .collect()
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all bindings
    pub fn iter(&self) -> impl Iterator<Item = (Ipv4Addr, MacAddr)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }
}
