//! Observable events of the index subsystem
//!
//! Events are explicit and typed. Per-call events are TRACE; failures are
//! ERROR. Operation begin/complete lines come from `ObservationScope`.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Driver reader selected for an intersection
    DriverSelected,
    /// One driver page consumed by a paginated intersection
    DriverPageRead,

    /// A reader reported zero entries; no reads issued
    ShortCircuit,

    /// A reader failed with a storage fault
    ReadFailed,

    /// Integrator configuration loaded
    ConfigLoaded,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::DriverSelected => "INTERSECT_DRIVER_SELECTED",
            Event::DriverPageRead => "INTERSECT_DRIVER_PAGE_READ",

            Event::ShortCircuit => "INDEX_SHORT_CIRCUIT",
            Event::ReadFailed => "INDEX_READ_FAILED",
            Event::ConfigLoaded => "INTEGRATOR_CONFIG_LOADED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ReadFailed => Severity::Error,
            Event::ConfigLoaded => Severity::Info,
            _ => Severity::Trace,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
