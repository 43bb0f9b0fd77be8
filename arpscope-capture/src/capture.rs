//! Packet capture wrapper around pcap

use arpscope_core::{Error, Packet, Result};
use parking_lot::{Mutex, RwLock};
use pcap::{Active, Capture, Device};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::interface::{get_interface, InterfaceInfo};
use crate::stats::{CaptureStats, StatsAccumulator};

/// Default snapshot length (maximum bytes per packet)
const DEFAULT_SNAPLEN: i32 = 65535;

/// Default timeout for packet capture (milliseconds)
const DEFAULT_TIMEOUT_MS: i32 = 1000;

/// Configuration for packet capture
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Maximum bytes to capture per packet
    pub snaplen: i32,
    /// Timeout in milliseconds
    pub timeout_ms: i32,
    /// Enable promiscuous mode
    pub promiscuous: bool,
    /// Buffer size (0 = default)
    pub buffer_size: i32,
    /// Enable immediate mode (deliver packets immediately)
    pub immediate_mode: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            snaplen: DEFAULT_SNAPLEN,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            promiscuous: true,
            buffer_size: 0,
            immediate_mode: true,
        }
    }
}

/// State of packet capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Capture is not running
    Stopped,
    /// Capture is actively running
    Running,
}

/// Main packet capture interface
///
/// One capture per interface; [`start`](Self::start) spawns a dedicated
/// capture thread that invokes the callback for every frame passing the
/// filter, in arrival order.
pub struct PacketCapture {
    /// Interface name
    interface: String,
    /// Interface information
    interface_info: InterfaceInfo,
    /// Capture configuration
    config: CaptureConfig,
    /// Active pcap capture (when running)
    capture: Arc<Mutex<Option<Capture<Active>>>>,
    /// Current BPF filter
    filter: Arc<RwLock<Option<String>>>,
    /// Current capture state
    state: Arc<RwLock<CaptureState>>,
    /// Statistics accumulator
    stats: StatsAccumulator,
}

impl PacketCapture {
    /// Create a new packet capture on the specified interface
    pub fn new(interface: &str) -> Result<Self> {
        let interface_info = get_interface(interface)?;

        if !interface_info.is_up {
            return Err(Error::capture(format!(
                "Interface '{}' is not up",
                interface
            )));
        }

        debug!("Created packet capture on interface: {}", interface);

        Ok(Self {
            interface: interface.to_string(),
            interface_info,
            config: CaptureConfig::default(),
            capture: Arc::new(Mutex::new(None)),
            filter: Arc::new(RwLock::new(None)),
            state: Arc::new(RwLock::new(CaptureState::Stopped)),
            stats: StatsAccumulator::new(),
        })
    }

    /// Create a new packet capture with custom configuration
    pub fn with_config(interface: &str, config: CaptureConfig) -> Result<Self> {
        let mut capture = Self::new(interface)?;
        capture.config = config;
        Ok(capture)
    }

    /// Set BPF filter for packet capture
    pub fn set_filter(&mut self, bpf: &str) -> Result<()> {
        debug!("Setting BPF filter: {}", bpf);

        // Validate the filter by compiling it against the device
        let device = Device::from(self.interface.as_str());
        let mut test_capture = Capture::from_device(device)
            .map_err(|e| Error::capture(format!("Failed to open device: {}", e)))?
            .open()
            .map_err(|e| Error::capture(format!("Failed to open capture: {}", e)))?;

        test_capture
            .filter(bpf, true)
            .map_err(|e| Error::capture(format!("Invalid BPF filter: {}", e)))?;

        *self.filter.write() = Some(bpf.to_string());

        // If capture is running, apply filter to the active capture
        let mut capture_guard = self.capture.lock();
        if let Some(capture) = capture_guard.as_mut() {
            capture
                .filter(bpf, true)
                .map_err(|e| Error::capture(format!("Failed to apply filter: {}", e)))?;
        }

        Ok(())
    }

    /// Get interface information
    pub fn interface_info(&self) -> &InterfaceInfo {
        &self.interface_info
    }

    /// Get current capture state
    pub fn state(&self) -> CaptureState {
        *self.state.read()
    }

    /// Check if capture is running
    pub fn is_running(&self) -> bool {
        *self.state.read() == CaptureState::Running
    }

    /// Get current statistics
    pub fn stats(&self) -> CaptureStats {
        self.stats.snapshot()
    }

    /// Get statistics from pcap
    pub fn pcap_stats(&self) -> Result<CaptureStats> {
        let mut capture_guard = self.capture.lock();
        if let Some(capture) = capture_guard.as_mut() {
            let stats = capture
                .stats()
                .map_err(|e| Error::capture(format!("Failed to get stats: {}", e)))?;
            Ok(CaptureStats::from_pcap_stats(stats, self.stats.elapsed()))
        } else {
            Err(Error::capture("Capture not active"))
        }
    }

    /// Initialize pcap capture
    fn init_capture(&self) -> Result<Capture<Active>> {
        debug!("Initializing pcap capture on {}", self.interface);

        let device = Device::from(self.interface.as_str());
        let mut capture = Capture::from_device(device)
            .map_err(|e| Error::capture(format!("Failed to create capture: {}", e)))?
            .promisc(self.config.promiscuous)
            .snaplen(self.config.snaplen)
            .timeout(self.config.timeout_ms)
            .immediate_mode(self.config.immediate_mode);

        if self.config.buffer_size > 0 {
            capture = capture.buffer_size(self.config.buffer_size);
        }

        let mut capture = capture
            .open()
            .map_err(|e| Error::capture(format!("Failed to open capture: {}", e)))?;

        if let Some(filter) = self.filter.read().as_ref() {
            capture
                .filter(filter, true)
                .map_err(|e| Error::capture(format!("Failed to apply filter: {}", e)))?;
            debug!("Applied filter: {}", filter);
        }

        info!("Capture initialized on {}", self.interface);
        Ok(capture)
    }

    /// Start packet capture with callback
    ///
    /// The callback runs on the capture thread; frames are delivered in the
    /// order pcap hands them over.
    pub fn start<F>(&mut self, mut callback: F) -> Result<()>
    where
        F: FnMut(Packet) + Send + 'static,
    {
        if *self.state.read() != CaptureState::Stopped {
            return Err(Error::capture("Capture already running"));
        }

        let capture = self.init_capture()?;
        *self.capture.lock() = Some(capture);
        *self.state.write() = CaptureState::Running;

        info!("Starting packet capture on {}", self.interface);

        let capture_arc = Arc::clone(&self.capture);
        let state_arc = Arc::clone(&self.state);
        let stats = self.stats.clone();
        let interface = self.interface.clone();

        thread::spawn(move || {
            let mut capture_guard = capture_arc.lock();
            if let Some(capture) = capture_guard.as_mut() {
                loop {
                    if *state_arc.read() == CaptureState::Stopped {
                        debug!("Capture stopped");
                        break;
                    }

                    match capture.next_packet() {
                        Ok(packet) => {
                            let packet_data = packet.data.to_vec();
                            stats.record_packet(packet_data.len());
                            callback(Packet::new(interface.clone(), packet_data));
                        }
                        Err(pcap::Error::TimeoutExpired) => {
                            // timeouts just give the stop flag a chance
                            continue;
                        }
                        Err(e) => {
                            error!("Packet capture error: {}", e);
                            break;
                        }
                    }
                }
            }

            *state_arc.write() = CaptureState::Stopped;
            debug!("Capture thread finished");
        });

        Ok(())
    }

    /// Stop packet capture
    pub fn stop(&mut self) -> Result<()> {
        if *self.state.read() == CaptureState::Stopped {
            return Ok(());
        }

        info!("Stopping packet capture on {}", self.interface);
        *self.state.write() = CaptureState::Stopped;

        // Give the thread time to notice and release the capture
        thread::sleep(Duration::from_millis(100));

        *self.capture.lock() = None;

        Ok(())
    }
}

impl Drop for PacketCapture {
    fn drop(&mut self) {
        // Capture must not outlive the handle
        let _ = self.stop();
    }
}
