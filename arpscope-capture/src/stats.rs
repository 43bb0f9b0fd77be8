//! Capture statistics and metrics

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Statistics for a capture session
#[derive(Debug, Clone, Default)]
pub struct CaptureStats {
    /// Number of packets received by the filter
    pub packets_received: u64,
    /// Number of packets dropped by the kernel
    pub packets_dropped: u64,
    /// Number of packets dropped by the interface
    pub packets_if_dropped: u64,
    /// Total bytes received
    pub bytes_received: u64,
    /// Capture duration
    pub duration: Duration,
}

impl CaptureStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Create statistics from pcap stats
    pub fn from_pcap_stats(stats: pcap::Stat, duration: Duration) -> Self {
        Self {
            packets_received: stats.received as u64,
            packets_dropped: stats.dropped as u64,
            packets_if_dropped: stats.if_dropped as u64,
            bytes_received: 0, // pcap doesn't provide this directly
            duration,
        }
    }

    /// Packets per second over the capture duration
    pub fn packets_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.packets_received as f64 / secs
        } else {
            0.0
        }
    }

    /// Calculate drop rate as percentage
    pub fn drop_rate(&self) -> f64 {
        if self.packets_received == 0 {
            return 0.0;
        }
        (self.packets_dropped as f64 / self.packets_received as f64) * 100.0
    }

    /// Format statistics as human-readable string
    pub fn format(&self) -> String {
        format!(
            "Received: {} packets ({} bytes)\n\
             Dropped: {} packets ({:.2}%)\n\
             Duration: {:.2}s\n\
             Rate: {:.2} pps",
            self.packets_received,
            self.bytes_received,
            self.packets_dropped,
            self.drop_rate(),
            self.duration.as_secs_f64(),
            self.packets_per_second(),
        )
    }
}

/// Thread-safe statistics accumulator for live capture
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    packets_received: Arc<AtomicU64>,
    bytes_received: Arc<AtomicU64>,
    start_time: Instant,
}

impl StatsAccumulator {
    /// Create a new statistics accumulator
    pub fn new() -> Self {
        Self {
            packets_received: Arc::new(AtomicU64::new(0)),
            bytes_received: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Record a received packet
    pub fn record_packet(&self, size: usize) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received
            .fetch_add(size as u64, Ordering::Relaxed);
    }

    /// Get current statistics snapshot
    pub fn snapshot(&self) -> CaptureStats {
        CaptureStats {
            packets_received: self.packets_received.load(Ordering::Relaxed),
            packets_dropped: 0,
            packets_if_dropped: 0,
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            duration: self.start_time.elapsed(),
        }
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
