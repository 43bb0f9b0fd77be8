//! Monitor mode flags

/// What the monitor emits for each valid announcement
///
/// The two capabilities are independently togglable; [`crate::ArpMonitor`]
/// refuses construction when neither is set, since a monitor that can never
/// emit anything is a configuration mistake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitorMode {
    /// Render every valid announcement verbatim, whether or not it changes
    /// the binding table
    pub dump_all: bool,
    /// Render new and changed IP <-> MAC mappings
    pub report_changes: bool,
}

impl MonitorMode {
    /// Check whether at least one capability is enabled
    pub fn any_enabled(&self) -> bool {
        self.dump_all || self.report_changes
    }
}
