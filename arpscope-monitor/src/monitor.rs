//! The classifier: one announcement in, zero or more event lines out

use arpscope_core::{Error, MacAddr, Result};
use arpscope_packet::ArpPacket;
use std::net::Ipv4Addr;
use tracing::{debug, error};

use crate::mode::MonitorMode;
use crate::sink::LineSink;
use crate::table::BindingTable;

const WARNING_PREFIX: &str = "[WARNING] ";
const CHANGE_MAPPING_PREFIX: &str = "[CHANGE MAPPING] ";
const NEW_MAPPING_PREFIX: &str = "[NEW MAPPING] ";

/// Tracks IPv4 <-> MAC bindings from a stream of ARP announcements
///
/// The monitor owns its [`BindingTable`] outright; nothing else mutates it.
/// Each call to [`observe`](Self::observe) is a complete, self-consistent
/// table transition, so the owning process may stop feeding announcements at
/// any point with no cleanup required. Not safe for concurrent callers:
/// funnel announcements through a single consumer.
pub struct ArpMonitor {
    mode: MonitorMode,
    table: BindingTable,
    sink: Box<dyn LineSink>,
}

impl ArpMonitor {
    /// Create a monitor emitting to `sink`
    ///
    /// Fails with [`Error::Config`] when `mode` has no capability enabled.
    pub fn new(mode: MonitorMode, sink: Box<dyn LineSink>) -> Result<Self> {
        if !mode.any_enabled() {
            return Err(Error::config(
                "no logging mode enabled, enable dump-all and/or report-changes",
            ));
        }
        Ok(Self {
            mode,
            table: BindingTable::new(),
            sink,
        })
    }

    /// Classify one announcement, updating the table and emitting lines
    ///
    /// Malformed announcements (hardware address not 6 bytes, protocol
    /// address not 4 bytes) produce a `[WARNING]` line and leave the table
    /// untouched. For valid announcements the table update always happens;
    /// the mode flags only control which lines are emitted. Sink failures
    /// are reported in the returned error after the table update completed,
    /// so classification state never depends on I/O outcome.
    pub fn observe(&mut self, announcement: &ArpPacket) -> Result<()> {
        if announcement.hlen != 6 {
            return self.sink.write_line(&format!(
                "{}Packet MAC address size is not correct: {}, but should be 6 bytes",
                WARNING_PREFIX, announcement.hlen
            ));
        }
        if announcement.plen != 4 {
            return self.sink.write_line(&format!(
                "{}Packet IPv4 address size is not correct: {}, but should be 4 bytes",
                WARNING_PREFIX, announcement.plen
            ));
        }

        let (Some(mac), Some(ip)) = (announcement.sender_mac(), announcement.sender_ipv4()) else {
            return Ok(());
        };

        let mut sink_failures: Vec<String> = Vec::new();
        let mut emit = |sink: &mut Box<dyn LineSink>, line: String| {
            if let Err(e) = sink.write_line(&line) {
                sink_failures.push(e.to_string());
            }
        };

        if self.mode.dump_all {
            emit(&mut self.sink, render_announcement(announcement));
        }

        match self.table.lookup(ip) {
            Some(current) if current == mac => {
                // known binding repeated, nothing new
                debug!(%ip, %mac, "binding already known");
            }
            Some(previous) => {
                // the IP now claims a different MAC; drop the MAC's old home
                if let Some(stale_ip) = self.take_stale_binding(mac) {
                    debug!(%stale_ip, %mac, "removed stale binding");
                }
                self.table.insert(ip, mac);
                if self.mode.report_changes {
                    emit(
                        &mut self.sink,
                        format!(
                            "{}Previous mapping: {} <-> {}, new mapping: {} <-> {}",
                            CHANGE_MAPPING_PREFIX, ip, previous, ip, mac
                        ),
                    );
                }
            }
            None => {
                if let Some(stale_ip) = self.take_stale_binding(mac) {
                    // the MAC migrated from another IP
                    self.table.insert(ip, mac);
                    if self.mode.report_changes {
                        emit(
                            &mut self.sink,
                            format!(
                                "{}Previous mapping: {} <-> {}, new mapping: {} <-> {}",
                                CHANGE_MAPPING_PREFIX, stale_ip, mac, ip, mac
                            ),
                        );
                    }
                } else {
                    self.table.insert(ip, mac);
                    if self.mode.report_changes {
                        emit(
                            &mut self.sink,
                            format!("{}{} <-> {}", NEW_MAPPING_PREFIX, ip, mac),
                        );
                    }
                }
            }
        }

        if sink_failures.is_empty() {
            Ok(())
        } else {
            Err(Error::sink(sink_failures.join("; ")))
        }
    }

    /// Remove and return the IP the MAC is currently bound to, if any
    ///
    /// The reverse-mapping invariant guarantees at most one match. Should
    /// more than one ever appear, that is table corruption from an upstream
    /// bug: the first match (iteration order is unspecified) is removed as
    /// documented and the collision is reported via the error log instead
    /// of being silently swallowed.
    fn take_stale_binding(&mut self, mac: MacAddr) -> Option<Ipv4Addr> {
        let stale = self.table.find_by_mac(mac);
        if stale.len() > 1 {
            error!(
                %mac,
                ips = ?stale,
                "binding table invariant violated: one MAC bound to multiple IPs"
            );
        }
        let ip = *stale.first()?;
        self.table.remove(ip);
        Some(ip)
    }

    /// Current binding table
    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    /// Mode flags the monitor was constructed with
    pub fn mode(&self) -> MonitorMode {
        self.mode
    }

    /// Flush the underlying sink
    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()
    }
}

/// Render the raw-dump line for one valid announcement
fn render_announcement(announcement: &ArpPacket) -> String {
    format!(
        "Operation: {}, Source MAC: {}, Source IP: {}, Destination MAC: {}, Destination IP: {}",
        announcement.operation,
        announcement.sender_mac().unwrap_or_else(MacAddr::zero),
        announcement
            .sender_ipv4()
            .unwrap_or(Ipv4Addr::UNSPECIFIED),
        announcement.target_mac().unwrap_or_else(MacAddr::zero),
        announcement
            .target_ipv4()
            .unwrap_or(Ipv4Addr::UNSPECIFIED),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use arpscope_packet::ArpOpcode;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn ip(last: u8) -> Ipv4Addr {
        Ipv4Addr::new(10, 0, 0, last)
    }

    fn mac(last: u8) -> MacAddr {
        MacAddr::new([0x02, 0x00, 0x00, 0x00, 0x00, last])
    }

    fn announcement(sender_ip: Ipv4Addr, sender_mac: MacAddr) -> ArpPacket {
        ArpPacket::new_reply(sender_mac, sender_ip, MacAddr::broadcast(), ip(255))
    }

    fn monitor(
        dump_all: bool,
        report_changes: bool,
    ) -> (ArpMonitor, Arc<Mutex<Vec<String>>>) {
        let sink = MemorySink::new();
        let lines = sink.handle();
        let mode = MonitorMode {
            dump_all,
            report_changes,
        };
        let monitor = ArpMonitor::new(mode, Box::new(sink)).unwrap();
        (monitor, lines)
    }

    /// MACs must never be shared between IPs after any observation
    fn assert_no_self_conflict(monitor: &ArpMonitor) {
        for (_, mac) in monitor.table().iter() {
            assert_eq!(
                monitor.table().find_by_mac(mac).len(),
                1,
                "MAC {} bound to multiple IPs",
                mac
            );
        }
    }

    #[test]
    fn test_rejects_mode_with_nothing_enabled() {
        let sink = MemorySink::new();
        let result = ArpMonitor::new(MonitorMode::default(), Box::new(sink));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_new_binding_detection() {
        let (mut monitor, lines) = monitor(false, true);

        monitor.observe(&announcement(ip(1), mac(1))).unwrap();

        assert_eq!(
            *lines.lock(),
            vec!["[NEW MAPPING] 10.0.0.1 <-> 02:00:00:00:00:01"]
        );
        assert_eq!(monitor.table().lookup(ip(1)), Some(mac(1)));
        assert_eq!(monitor.table().len(), 1);
    }

    #[test]
    fn test_repeated_binding_is_idempotent() {
        let (mut monitor, lines) = monitor(false, true);

        monitor.observe(&announcement(ip(1), mac(1))).unwrap();
        monitor.observe(&announcement(ip(1), mac(1))).unwrap();

        // one event line for the first call, none for the second
        assert_eq!(lines.lock().len(), 1);
        assert_eq!(monitor.table().lookup(ip(1)), Some(mac(1)));
        assert_eq!(monitor.table().len(), 1);
    }

    #[test]
    fn test_changed_binding_detection() {
        let (mut monitor, lines) = monitor(false, true);

        monitor.observe(&announcement(ip(1), mac(1))).unwrap();
        monitor.observe(&announcement(ip(1), mac(2))).unwrap();

        let recorded = lines.lock();
        assert_eq!(recorded.len(), 2);
        assert_eq!(
            recorded[1],
            "[CHANGE MAPPING] Previous mapping: 10.0.0.1 <-> 02:00:00:00:00:01, \
             new mapping: 10.0.0.1 <-> 02:00:00:00:00:02"
        );
        assert_eq!(monitor.table().lookup(ip(1)), Some(mac(2)));
        assert_eq!(monitor.table().len(), 1);
    }

    #[test]
    fn test_migration_removes_stale_entry() {
        let (mut monitor, lines) = monitor(false, true);

        // {A: M1}, then (B, M1): M1 migrates from A to B
        monitor.observe(&announcement(ip(1), mac(1))).unwrap();
        monitor.observe(&announcement(ip(2), mac(1))).unwrap();

        let recorded = lines.lock();
        assert_eq!(recorded.len(), 2);
        assert_eq!(
            recorded[1],
            "[CHANGE MAPPING] Previous mapping: 10.0.0.1 <-> 02:00:00:00:00:01, \
             new mapping: 10.0.0.2 <-> 02:00:00:00:00:01"
        );
        assert_eq!(monitor.table().lookup(ip(1)), None);
        assert_eq!(monitor.table().lookup(ip(2)), Some(mac(1)));
        assert_eq!(monitor.table().len(), 1);
    }

    #[test]
    fn test_change_to_known_mac_drops_old_home() {
        let (mut monitor, _lines) = monitor(false, true);

        // {A: M1, B: M2}, then (A, M2): B's entry must go away
        monitor.observe(&announcement(ip(1), mac(1))).unwrap();
        monitor.observe(&announcement(ip(2), mac(2))).unwrap();
        monitor.observe(&announcement(ip(1), mac(2))).unwrap();

        assert_eq!(monitor.table().lookup(ip(1)), Some(mac(2)));
        assert_eq!(monitor.table().lookup(ip(2)), None);
        assert_eq!(monitor.table().len(), 1);
        assert_no_self_conflict(&monitor);
    }

    #[test]
    fn test_no_self_conflict_over_shuffled_sequence() {
        let (mut monitor, _lines) = monitor(false, true);

        let sequence = [
            (1u8, 1u8),
            (2, 2),
            (3, 3),
            (1, 2), // ip1 takes over M2
            (2, 3), // ip2 takes over M3
            (3, 1),
            (1, 1),
            (2, 1), // M1 migrates again
        ];
        for (i, m) in sequence {
            monitor.observe(&announcement(ip(i), mac(m))).unwrap();
            assert_no_self_conflict(&monitor);
        }
    }

    #[test]
    fn test_malformed_hw_length_rejected() {
        let (mut monitor, lines) = monitor(true, true);

        let mut bad = announcement(ip(1), mac(1));
        bad.hlen = 5;
        bad.sender_hw.truncate(5);
        bad.target_hw.truncate(5);
        monitor.observe(&bad).unwrap();

        // one warning, no dump, no classification, no table mutation
        assert_eq!(
            *lines.lock(),
            vec!["[WARNING] Packet MAC address size is not correct: 5, but should be 6 bytes"]
        );
        assert!(monitor.table().is_empty());
    }

    #[test]
    fn test_malformed_proto_length_rejected() {
        let (mut monitor, lines) = monitor(true, true);

        let mut bad = announcement(ip(1), mac(1));
        bad.plen = 16;
        monitor.observe(&bad).unwrap();

        assert_eq!(
            *lines.lock(),
            vec!["[WARNING] Packet IPv4 address size is not correct: 16, but should be 4 bytes"]
        );
        assert!(monitor.table().is_empty());
    }

    #[test]
    fn test_dump_all_without_reporting_still_updates_table() {
        let (mut monitor, lines) = monitor(true, false);

        monitor.observe(&announcement(ip(1), mac(1))).unwrap();
        monitor.observe(&announcement(ip(1), mac(1))).unwrap();
        monitor.observe(&announcement(ip(1), mac(2))).unwrap();

        let recorded = lines.lock();
        // exactly one raw-dump line per valid announcement, no event lines
        assert_eq!(recorded.len(), 3);
        for line in recorded.iter() {
            assert!(line.starts_with("Operation: Reply, Source MAC: 02:00:00:00:00:0"));
        }
        assert_eq!(monitor.table().lookup(ip(1)), Some(mac(2)));
    }

    #[test]
    fn test_dump_line_format() {
        let (mut monitor, lines) = monitor(true, false);

        let packet = ArpPacket::new_reply(
            mac(1),
            ip(1),
            MacAddr::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            ip(2),
        );
        monitor.observe(&packet).unwrap();

        assert_eq!(
            *lines.lock(),
            vec![
                "Operation: Reply, Source MAC: 02:00:00:00:00:01, Source IP: 10.0.0.1, \
                 Destination MAC: aa:bb:cc:dd:ee:ff, Destination IP: 10.0.0.2"
            ]
        );
    }

    #[test]
    fn test_request_and_reply_both_classified() {
        let (mut monitor, lines) = monitor(false, true);

        let request = ArpPacket::new_request(mac(1), ip(1), ip(9));
        assert_eq!(request.operation, ArpOpcode::Request);
        monitor.observe(&request).unwrap();

        let reply = ArpPacket::new_reply(mac(2), ip(2), mac(1), ip(1));
        monitor.observe(&reply).unwrap();

        assert_eq!(lines.lock().len(), 2);
        assert_eq!(monitor.table().len(), 2);
    }

    #[test]
    fn test_sink_failure_leaves_classification_state_intact() {
        struct BrokenSink;
        impl crate::sink::LineSink for BrokenSink {
            fn write_line(&mut self, _line: &str) -> arpscope_core::Result<()> {
                Err(Error::sink("disk full"))
            }
        }

        let mode = MonitorMode {
            dump_all: false,
            report_changes: true,
        };
        let mut monitor = ArpMonitor::new(mode, Box::new(BrokenSink)).unwrap();

        let result = monitor.observe(&announcement(ip(1), mac(1)));
        assert!(matches!(result, Err(Error::Sink(_))));

        // the table was updated even though the line never landed
        assert_eq!(monitor.table().lookup(ip(1)), Some(mac(1)));

        // repeat of the now-known binding emits nothing, so no error either
        monitor.observe(&announcement(ip(1), mac(1))).unwrap();
    }
}
