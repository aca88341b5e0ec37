//! Package blueprint loading.
//!
//! Concrete per-package command lists are configuration data, not code;
//! they live in YAML blueprints compiled into plans at dispatch time.

pub mod blueprint;

pub use blueprint::{Blueprint, BlueprintMilestone};
