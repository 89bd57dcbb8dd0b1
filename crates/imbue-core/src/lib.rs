//! imbue-core: Cross-platform core library for the imbue recipe client
//!
//! This library implements the local persistence subsystem the mobile and
//! web shells build on:
//! - Runtime platform detection (web, Android, iOS)
//! - Durable bootstrap markers that account for the one-time seeding
//! - Cold/warm database provisioning from a bundled seed export
//! - The publication record codec (structured fields over JSON-text columns)
//! - The `recipes` CRUD gateway with its per-platform result and
//!   persistence rules
//! - A one-shot readiness signal shells await before issuing CRUD calls
//!
//! The Swift and Kotlin shells reach all of this through UniFFI bindings.

pub mod codec;
pub mod config;
pub mod domain;
pub mod markers;
pub mod platform;
pub mod readiness;
pub mod seed;
pub mod store_api;

// Re-export main types for convenience
pub use codec::CodecError;
pub use config::{ConfigError, StoreConfig};
pub use domain::{Description, Ingredient, Publication, TimeValue};
pub use markers::{BootstrapState, FileMarkerStore, MarkerError, MarkerStore, MemoryMarkerStore};
pub use platform::{Platform, PlatformError};
pub use readiness::{Readiness, ReadinessProbe};
pub use seed::{SeedError, SeedSource};
pub use store_api::{ImbueStore, StoreApiError};

// Setup UniFFI - use proc macros only, no UDL file
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

/// Returns the version of imbue-core
#[cfg(feature = "uniffi")]
#[uniffi::export]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
