//! Manifest validation command.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::OutputFormat;
use plugboard_core::config::PlugboardConfig;
use plugboard_core::{PluginError, PluginResult};
use plugboard_plugin::{PluginManifest, discover_manifests};

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Manifest files; defaults to every manifest in `registry.manifest_dir`
    pub paths: Vec<PathBuf>,
}

/// Manifest display row for table output
#[derive(Debug, Serialize, Tabled)]
struct ManifestRow {
    /// Manifest file
    file: String,
    /// Plugin ID
    id: String,
    /// Plugin name
    name: String,
    /// Version
    version: String,
    /// Author
    author: String,
    /// Validation outcome
    status: String,
}

impl ManifestRow {
    fn is_valid(&self) -> bool {
        self.status == "valid"
    }
}

/// Execute the validate command
pub fn execute(
    args: &ValidateArgs,
    config: &PlugboardConfig,
    format: OutputFormat,
) -> PluginResult<()> {
    let paths = if args.paths.is_empty() {
        discover_manifests(&config.registry.manifest_dir)?
    } else {
        args.paths.clone()
    };

    let rows: Vec<ManifestRow> = paths.iter().map(|path| check(path)).collect();
    format.emit(&rows)?;

    let invalid = rows.iter().filter(|row| !row.is_valid()).count();
    if invalid > 0 {
        return Err(PluginError::manifest(
            "plugboard",
            format!("{invalid} of {} manifests are invalid", rows.len()),
        ));
    }

    format.status(&format!("{} manifests are valid", rows.len()));
    Ok(())
}

fn check(path: &Path) -> ManifestRow {
    let file = path.display().to_string();
    match PluginManifest::load(path).and_then(|manifest| manifest.validate()) {
        Ok(descriptor) => ManifestRow {
            file,
            id: descriptor.id.to_string(),
            name: descriptor.name,
            version: descriptor.version.to_string(),
            author: descriptor.author,
            status: "valid".to_string(),
        },
        Err(e) => {
            tracing::debug!(path = %file, error = %e, "Manifest rejected");
            ManifestRow {
                file,
                id: String::new(),
                name: String::new(),
                version: String::new(),
                author: String::new(),
                status: e.to_string(),
            }
        }
    }
}
