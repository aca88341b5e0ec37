//! Domain types for the provis orchestrator.
//!
//! This module contains the core data structures:
//! - Progress: persisted milestone-status events
//! - Package: category taxonomy, host references, resource status
//! - Identity: remote account resolution

pub mod identity;
pub mod package;
pub mod progress;

// Re-export commonly used types
pub use identity::{resolve_identity, Identity, IdentityDefaults};
pub use package::{HostRef, PackageCategory, PackageScope, ResourceStatus};
pub use progress::{Direction, EventStatus, ProgressEvent};
