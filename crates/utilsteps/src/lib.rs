//! Utility steps: UUID generation, timestamps, waiting and host facts.
//!
//! [`registry`] is the composition root. It registers every step once and
//! returns the immutable [`Registry`] that hosts dispatch through.
//!
//! ```rust
//! use serde_json::json;
//! use utilsteps::registry;
//! use utilsteps_core::RunContext;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let registry = registry().expect("valid registry");
//! let outcome = registry
//!     .invoke("wait", json!({"wait_time_ms": 5}), &RunContext::new("docs"))
//!     .await
//!     .expect("invocation");
//! assert_eq!(outcome.tag, "success");
//! # }
//! ```

pub mod host;
pub mod steps;

use host::{HostProbe, SystemProbe};
use std::sync::Arc;
use steps::{AvailableMemory, GenerateTimestamp, GenerateUuid, NumCpu, Wait};
use utilsteps_core::{Registry, RegistryError};

/// Builds the registry of all utility steps backed by the real host.
pub fn registry() -> Result<Registry, RegistryError> {
    registry_with_probe(Arc::new(SystemProbe))
}

/// Builds the registry with a custom host probe.
pub fn registry_with_probe(probe: Arc<dyn HostProbe>) -> Result<Registry, RegistryError> {
    Registry::builder()
        .register(GenerateUuid)
        .register(GenerateTimestamp)
        .register(Wait)
        .register(NumCpu::new(Arc::clone(&probe)))
        .register(AvailableMemory::new(probe))
        .build()
}
