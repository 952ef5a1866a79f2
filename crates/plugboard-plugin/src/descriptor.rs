//! Plugin descriptors and the schema validator.
//!
//! A plugin type declares its identity as a loosely typed attribute map
//! (from code via [`plugin_descriptor!`](crate::plugin_descriptor) or from
//! a manifest file). [`validate_descriptor`] checks that map once, before
//! anything is registered, and produces the typed [`PluginDescriptor`].
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. the type name ends with `Plugin` (else a `Name` error);
//! 2. `id` is present (else an `Attribute` error);
//! 3. `id` normalizes to a lowercase, undashed UUID4 (else an `Id` error);
//! 4. `name`, `version`, `author`, `description` are present, then each
//!    has the right type (else an `Attribute` error naming the field).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use plugboard_core::{ErrorKind, PluginError, PluginId, PluginResult};

/// Raw descriptor attributes as declared by a plugin type.
pub type DescriptorAttributes = serde_json::Map<String, Value>;

/// Suffix every plugin type name must carry.
pub const PLUGIN_SUFFIX: &str = "Plugin";

/// Attribute holding the plugin id.
pub const ID: &str = "id";
/// Attribute holding the human-readable name.
pub const NAME: &str = "name";
/// Attribute holding the `[major, minor, patch]` version.
pub const VERSION: &str = "version";
/// Attribute holding the author.
pub const AUTHOR: &str = "author";
/// Attribute holding the description.
pub const DESCRIPTION: &str = "description";

/// Three-part plugin version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PluginVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl PluginVersion {
    /// Creates a version from its parts.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl From<(u32, u32, u32)> for PluginVersion {
    fn from((major, minor, patch): (u32, u32, u32)) -> Self {
        Self::new(major, minor, patch)
    }
}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A validated plugin descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Normalized plugin id.
    pub id: PluginId,
    /// Name of the declaring plugin type.
    pub type_name: String,
    /// Human-readable plugin name.
    pub name: String,
    /// Plugin version.
    pub version: PluginVersion,
    /// Author or maintainer.
    pub author: String,
    /// Plugin description.
    pub description: String,
}

/// Validates a plugin type's declared attributes.
pub fn validate_descriptor(
    type_name: &str,
    attributes: &DescriptorAttributes,
) -> PluginResult<PluginDescriptor> {
    if !type_name.ends_with(PLUGIN_SUFFIX) {
        return Err(PluginError::name(
            type_name,
            format!("Main plugin type name should end with '{PLUGIN_SUFFIX}'"),
        ));
    }

    let raw_id = attributes
        .get(ID)
        .ok_or_else(|| missing(type_name, ID))?
        .as_str()
        .ok_or_else(|| {
            PluginError::id(type_name, "Invalid plugin id. A UUID4 string is required.")
        })?;

    let id = PluginId::parse(raw_id).map_err(|e| {
        PluginError::with_source(
            ErrorKind::Id,
            type_name,
            format!("Invalid plugin id '{raw_id}'. A valid UUID4 is required: {e}"),
            e,
        )
    })?;

    for field in [NAME, VERSION, AUTHOR, DESCRIPTION] {
        if !attributes.contains_key(field) {
            return Err(missing(type_name, field));
        }
    }

    let name = string_field(type_name, attributes, NAME)?;
    let version = version_field(type_name, attributes)?;
    let author = string_field(type_name, attributes, AUTHOR)?;
    let description = string_field(type_name, attributes, DESCRIPTION)?;

    Ok(PluginDescriptor {
        id,
        type_name: type_name.to_string(),
        name,
        version,
        author,
        description,
    })
}

fn missing(type_name: &str, field: &str) -> PluginError {
    PluginError::attribute(type_name, format!("`{field}` attribute is missing"))
}

fn string_field(
    type_name: &str,
    attributes: &DescriptorAttributes,
    field: &str,
) -> PluginResult<String> {
    attributes
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            PluginError::attribute(type_name, format!("Plugin `{field}` should be a string"))
        })
}

fn version_field(type_name: &str, attributes: &DescriptorAttributes) -> PluginResult<PluginVersion> {
    let invalid = || {
        PluginError::attribute(
            type_name,
            format!("Plugin `{VERSION}` should be an array of 3 non-negative integers"),
        )
    };

    let parts = attributes
        .get(VERSION)
        .and_then(Value::as_array)
        .ok_or_else(invalid)?;
    if parts.len() != 3 {
        return Err(invalid());
    }

    let numbers = parts
        .iter()
        .map(|part| {
            part.as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(invalid)
        })
        .collect::<PluginResult<Vec<u32>>>()?;

    Ok(PluginVersion::new(numbers[0], numbers[1], numbers[2]))
}
