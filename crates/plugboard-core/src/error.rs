//! Unified plugin error types for Plugboard.
//!
//! Every failure the framework reports is a [`PluginError`] carrying the
//! offending plugin's name, a message, and an [`ErrorKind`] from the
//! documented taxonomy. Crate-specific failures are mapped into it with
//! `From` impls or explicit `.map_err()` calls.

use std::fmt;
use thiserror::Error;

/// Error kind categorization used across the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Missing, invalid, duplicate, or unknown plugin identifier.
    Id,
    /// The declaring type's name lacks the `Plugin` suffix.
    ///
    /// Specializes [`ErrorKind::Id`].
    Name,
    /// A required descriptor field is missing or has the wrong type.
    Attribute,
    /// A proxy lookup did not resolve to a hook on the target plugin.
    Method,
    /// A referenced hook does not exist on the target plugin.
    Hook,
    /// A subscribed handler failed during hook invocation.
    Handler,
    /// Configuration could not be loaded or deserialized.
    Configuration,
    /// A plugin manifest file could not be read or parsed.
    Manifest,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => write!(f, "ID"),
            Self::Name => write!(f, "NAME"),
            Self::Attribute => write!(f, "ATTRIBUTE"),
            Self::Method => write!(f, "METHOD"),
            Self::Hook => write!(f, "HOOK"),
            Self::Handler => write!(f, "HANDLER"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Manifest => write!(f, "MANIFEST"),
        }
    }
}

/// The plugin error used throughout Plugboard.
#[derive(Debug, Error)]
#[error("{kind}: Plugin: {plugin}: {message}")]
pub struct PluginError {
    /// The category of error.
    pub kind: ErrorKind,
    /// Name of the plugin (or plugin type) the error is about.
    pub plugin: String,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PluginError {
    /// Create a new plugin error.
    pub fn new(kind: ErrorKind, plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            plugin: plugin.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a new plugin error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        plugin: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            plugin: plugin.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an identifier error.
    pub fn id(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Id, plugin, message)
    }

    /// Create a type-name error.
    pub fn name(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Name, plugin, message)
    }

    /// Create a descriptor attribute error.
    pub fn attribute(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Attribute, plugin, message)
    }

    /// Create a proxy method-resolution error.
    pub fn method(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Method, plugin, message)
    }

    /// Create a missing-hook error.
    pub fn hook(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Hook, plugin, message)
    }

    /// Create a handler failure error.
    pub fn handler(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Handler, plugin, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, "plugboard", message)
    }

    /// Create a manifest error.
    pub fn manifest(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Manifest, plugin, message)
    }

    /// Whether this is an identifier error, including its `Name` specialization.
    pub fn is_id_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Id | ErrorKind::Name)
    }
}

impl Clone for PluginError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            plugin: self.plugin.clone(),
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for PluginError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Manifest,
            "plugboard",
            format!("JSON error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for PluginError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(
            ErrorKind::Manifest,
            "plugboard",
            format!("I/O error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for PluginError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            "plugboard",
            format!("Configuration error: {err}"),
            err,
        )
    }
}
