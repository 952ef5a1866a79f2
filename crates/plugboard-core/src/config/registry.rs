//! Plugin registry configuration.

use serde::{Deserialize, Serialize};

/// What the registry does when a plugin id is registered a second time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail the second registration with an id error.
    #[default]
    Reject,
    /// Replace the earlier instance and its hooks.
    Overwrite,
}

/// Plugin registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Policy for duplicate plugin ids.
    #[serde(default)]
    pub duplicate_ids: DuplicatePolicy,
    /// Directory containing plugin manifest files.
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            duplicate_ids: DuplicatePolicy::default(),
            manifest_dir: default_manifest_dir(),
        }
    }
}

fn default_manifest_dir() -> String {
    "./plugins".to_string()
}
