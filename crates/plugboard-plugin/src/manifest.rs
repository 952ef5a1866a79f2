//! Plugin manifest files.
//!
//! A manifest carries a plugin's declared attributes outside the code:
//! a `type_name` key plus the descriptor attributes, in TOML, JSON or
//! YAML. Files are read through the `config` crate with the format
//! chosen by extension.
//!
//! ```toml
//! type_name = "GreeterPlugin"
//! id = "4f1e2d3c-5b6a-4789-8abc-def012345678"
//! name = "Greeter"
//! version = [1, 0, 0]
//! author = "Dev"
//! description = "Says hello"
//! ```

use std::any::Any;
use std::path::{Path, PathBuf};

use config::FileFormat;
use serde_json::Value;
use tracing::debug;

use plugboard_core::{ErrorKind, PluginError, PluginResult};

use crate::context::PluginContext;
use crate::declaration::PluginDeclaration;
use crate::descriptor::{DescriptorAttributes, PluginDescriptor, validate_descriptor};

/// Manifest key holding the declaring type name.
pub const TYPE_NAME: &str = "type_name";

/// Recognized manifest extensions.
pub const MANIFEST_EXTENSIONS: &[&str] = &["toml", "json", "yaml", "yml"];

/// A plugin manifest read from disk.
#[derive(Debug, Clone)]
pub struct PluginManifest {
    /// File the manifest was read from.
    pub path: PathBuf,
    /// Declaring type name.
    pub type_name: String,
    /// Descriptor attributes, `type_name` removed.
    pub attributes: DescriptorAttributes,
}

impl PluginManifest {
    /// Reads a manifest file.
    pub fn load(path: impl AsRef<Path>) -> PluginResult<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let format = file_format(path).ok_or_else(|| {
            PluginError::manifest(
                &label,
                format!("Unsupported manifest extension (expected one of {MANIFEST_EXTENSIONS:?})"),
            )
        })?;

        let mut attributes: DescriptorAttributes = config::Config::builder()
            .add_source(config::File::from(path).format(format).required(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| {
                PluginError::with_source(
                    ErrorKind::Manifest,
                    &label,
                    "Failed to read manifest",
                    e,
                )
            })?;

        let type_name = match attributes.remove(TYPE_NAME) {
            Some(Value::String(type_name)) => type_name,
            Some(_) => {
                return Err(PluginError::attribute(
                    &label,
                    format!("Attribute '{TYPE_NAME}' should be a string"),
                ));
            }
            None => {
                return Err(PluginError::attribute(
                    &label,
                    format!("Missing attribute '{TYPE_NAME}'"),
                ));
            }
        };

        debug!(path = %label, type_name = %type_name, "Manifest loaded");

        Ok(Self {
            path: path.to_path_buf(),
            type_name,
            attributes,
        })
    }

    /// Runs the descriptor validator without registering anything.
    pub fn validate(&self) -> PluginResult<PluginDescriptor> {
        validate_descriptor(&self.type_name, &self.attributes)
    }

    /// Pairs the manifest with a factory, ready for registration.
    pub fn into_declaration<F, T>(self, factory: F) -> PluginDeclaration
    where
        F: FnOnce(&PluginContext) -> PluginResult<T> + Send + 'static,
        T: Any + Send + Sync,
    {
        PluginDeclaration::new(self.type_name, self.attributes, factory)
    }
}

/// Lists manifest files directly inside `dir`, sorted by path.
pub fn discover_manifests(dir: impl AsRef<Path>) -> PluginResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut manifests = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && file_format(&path).is_some() {
            manifests.push(path);
        }
    }

    manifests.sort();
    debug!(dir = %dir.display(), count = manifests.len(), "Manifests discovered");
    Ok(manifests)
}

fn file_format(path: &Path) -> Option<FileFormat> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "toml" => Some(FileFormat::Toml),
        "json" => Some(FileFormat::Json),
        "yaml" | "yml" => Some(FileFormat::Yaml),
        _ => None,
    }
}
