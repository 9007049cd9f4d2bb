//! Metrics registry for the index subsystem
//!
//! - Counters only, monotonic
//! - Relaxed atomics: counters never feed back into algorithm decisions
//! - One process-wide registry, reachable through [`metrics`]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Operational counters of the integrator
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Union operations completed
    merges: AtomicU64,
    /// Full intersections completed
    intersections: AtomicU64,
    /// Paginated intersections completed
    paged_intersections: AtomicU64,
    /// Operations answered empty from counts alone
    short_circuits: AtomicU64,
    /// Driver pages read by paginated intersections
    driver_pages: AtomicU64,
    /// Candidate probes issued against non-driver readers
    probes: AtomicU64,
    /// Reader calls that failed with a storage fault
    storage_failures: AtomicU64,
}

static GLOBAL: OnceLock<MetricsRegistry> = OnceLock::new();

/// The process-wide registry
pub fn metrics() -> &'static MetricsRegistry {
    GLOBAL.get_or_init(MetricsRegistry::new)
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment merges
    pub fn increment_merges(&self) {
        self.merges.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment full intersections
    pub fn increment_intersections(&self) {
        self.intersections.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment paginated intersections
    pub fn increment_paged_intersections(&self) {
        self.paged_intersections.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment short circuits
    pub fn increment_short_circuits(&self) {
        self.short_circuits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment driver pages read
    pub fn increment_driver_pages(&self) {
        self.driver_pages.fetch_add(1, Ordering::Relaxed);
    }

    /// Add probe calls
    pub fn add_probes(&self, probes: u64) {
        self.probes.fetch_add(probes, Ordering::Relaxed);
    }

    /// Increment storage failures
    pub fn increment_storage_failures(&self) {
        self.storage_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            merges: self.merges.load(Ordering::Relaxed),
            intersections: self.intersections.load(Ordering::Relaxed),
            paged_intersections: self.paged_intersections.load(Ordering::Relaxed),
            short_circuits: self.short_circuits.load(Ordering::Relaxed),
            driver_pages: self.driver_pages.load(Ordering::Relaxed),
            probes: self.probes.load(Ordering::Relaxed),
            storage_failures: self.storage_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub merges: u64,
    pub intersections: u64,
    pub paged_intersections: u64,
    pub short_circuits: u64,
    pub driver_pages: u64,
    pub probes: u64,
    pub storage_failures: u64,
}
