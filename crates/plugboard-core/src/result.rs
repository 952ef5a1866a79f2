//! Convenience result type alias for Plugboard.

use crate::error::PluginError;

/// A specialized `Result` type for plugin framework operations.
pub type PluginResult<T> = Result<T, PluginError>;
