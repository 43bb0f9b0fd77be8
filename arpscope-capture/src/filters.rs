//! BPF (Berkeley Packet Filter) filter builders

/// ARP filter
///
/// Captures all ARP packets, which is the default watch filter
pub fn arp_filter() -> String {
    "arp".to_string()
}

/// RARP filter
pub fn rarp_filter() -> String {
    "rarp".to_string()
}

/// Filter for a specific source or destination IP
pub fn host_filter(ip: &str) -> String {
    format!("host {}", ip)
}

/// Filter for a specific source MAC address
pub fn src_mac_filter(mac: &str) -> String {
    format!("ether src {}", mac)
}

/// Combine multiple filters with AND logic
pub fn combine_filters(filters: &[&str]) -> String {
    if filters.is_empty() {
        return String::new();
    }

    filters
        .iter()
        .map(|f| format!("({})", f))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Combine multiple filters with OR logic
pub fn combine_filters_or(filters: &[&str]) -> String {
    if filters.is_empty() {
        return String::new();
    }

    filters
        .iter()
        .map(|f| format!("({})", f))
        .collect::<Vec<_>>()
        .join(" or ")
}
