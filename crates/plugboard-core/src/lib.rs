//! # plugboard-core
//!
//! Core crate for Plugboard. Contains the plugin error taxonomy, the typed
//! plugin identifier, and the configuration schemas shared by the
//! framework and its binaries.
//!
//! This crate has **no** internal dependencies on other Plugboard crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{ErrorKind, PluginError};
pub use result::PluginResult;
pub use types::id::{InvalidPluginId, PluginId};
