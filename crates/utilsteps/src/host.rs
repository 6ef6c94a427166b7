//! Host facts the steps read: CPU topology and memory counters.

use std::fmt::Debug;
use std::num::NonZeroUsize;
use sysinfo::System;

/// Read-only view of the host the steps run on.
///
/// Steps take this as a trait object so tests can stand in for hosts that
/// cannot report a value.
pub trait HostProbe: Send + Sync + Debug {
    /// Number of logical CPUs, or `None` when the host cannot tell.
    fn logical_cpus(&self) -> Option<NonZeroUsize>;

    /// Memory available for new allocations, in bytes.
    fn available_memory(&self) -> u64;
}

/// Probe backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl HostProbe for SystemProbe {
    fn logical_cpus(&self) -> Option<NonZeroUsize> {
        std::thread::available_parallelism().ok()
    }

    fn available_memory(&self) -> u64 {
        let mut system = System::new();
        system.refresh_memory();
        system.available_memory()
    }
}
