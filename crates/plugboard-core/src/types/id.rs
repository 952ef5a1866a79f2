//! Newtype wrapper around [`uuid::Uuid`] for plugin identifiers.
//!
//! A plugin id is written as a version-4 UUID, with or without dashes.
//! Its normalized form is the 32-character lowercase hex string with no
//! separators; parsing strips dashes and then insists that the result
//! survives a round trip through [`Uuid`] unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::{Uuid, Variant, Version};

/// Length of a normalized plugin id.
const NORMALIZED_LEN: usize = 32;

/// Reasons a string is not a valid plugin id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPluginId {
    /// Wrong number of hex digits once dashes are removed.
    #[error("expected 32 hex digits, found {0}")]
    Length(usize),
    /// A character outside `0-9a-f`.
    #[error("'{0}' is not a hex digit")]
    NotHex(char),
    /// Upper-case hex digits do not survive normalization.
    #[error("hex digits must be lower case")]
    UpperCase,
    /// The version nibble is not 4.
    #[error("UUID version {0} is not 4")]
    Version(usize),
    /// The variant bits are not RFC 4122.
    #[error("UUID variant is not RFC 4122")]
    Variant,
    /// The parsed value does not format back to the input.
    #[error("'{0}' does not round-trip as a UUID4")]
    NotCanonical(String),
}

/// Unique identifier for a plugin: a version-4 UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginId(Uuid);

impl PluginId {
    /// Create a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Normalize and validate a dashed or undashed id string.
    pub fn parse(raw: &str) -> Result<Self, InvalidPluginId> {
        let normalized = normalize(raw);

        let length = normalized.chars().count();
        if length != NORMALIZED_LEN {
            return Err(InvalidPluginId::Length(length));
        }
        if let Some(c) = normalized.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(InvalidPluginId::NotHex(c));
        }
        if normalized.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(InvalidPluginId::UpperCase);
        }

        let uuid = Uuid::try_parse(&normalized)
            .map_err(|_| InvalidPluginId::NotCanonical(normalized.clone()))?;

        if uuid.get_version() != Some(Version::Random) {
            return Err(InvalidPluginId::Version(uuid.get_version_num()));
        }
        if uuid.get_variant() != Variant::RFC4122 {
            return Err(InvalidPluginId::Variant);
        }
        if uuid.simple().to_string() != normalized {
            return Err(InvalidPluginId::NotCanonical(normalized));
        }

        Ok(Self(uuid))
    }

    /// Return the inner UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }

    /// Return a reference to the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

/// Strip the `-` separators from a raw id string.
pub fn normalize(raw: &str) -> String {
    raw.replace('-', "")
}

impl Default for PluginId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for PluginId {
    type Err = InvalidPluginId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PluginId {
    type Error = InvalidPluginId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PluginId> for String {
    fn from(id: PluginId) -> String {
        id.to_string()
    }
}

impl From<PluginId> for Uuid {
    fn from(id: PluginId) -> Uuid {
        id.0
    }
}
