//! Sample wiring command.

use serde::Serialize;
use tabled::Tabled;

use crate::output::OutputFormat;
use plugboard_core::PluginResult;
use plugboard_core::config::PlugboardConfig;
use plugboard_plugin::PluginRegistry;

/// Plugin display row for table output
#[derive(Debug, Serialize, Tabled)]
struct PluginRow {
    /// Plugin ID
    id: String,
    /// Plugin name
    name: String,
    /// Version
    version: String,
    /// Author
    author: String,
    /// Hooks owned by the plugin
    hooks: String,
    /// Registered at
    registered_at: String,
}

/// Execute the samples command
pub fn execute(config: &PlugboardConfig, format: OutputFormat) -> PluginResult<()> {
    let registry = PluginRegistry::new(config.registry.clone());
    plugin_samples::register_all(&registry)?;
    let report = registry.flush_connections()?;

    let mut rows = Vec::new();
    for descriptor in registry.list() {
        let plugin = registry.lookup(descriptor.id)?;
        rows.push(PluginRow {
            id: descriptor.id.to_string(),
            name: descriptor.name.clone(),
            version: descriptor.version.to_string(),
            author: descriptor.author.clone(),
            hooks: registry.hook_names(descriptor.id)?.join(", "),
            registered_at: plugin.registered_at().format("%Y-%m-%d %H:%M:%S").to_string(),
        });
    }

    format.emit(&rows)?;
    format.status(&format!(
        "{} plugins registered, {} connections made",
        rows.len(),
        report.connected
    ));

    registry.clear();
    Ok(())
}
