//! Plugboard host: embeds the plugin registry and runs the sample plugins.
//!
//! Wires configuration, logging, and the registry together, registers the
//! compiled-in sample plugins, flushes their connections, and fires a few
//! ticks through the clock's hook.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use plugboard_core::config::PlugboardConfig;
use plugboard_core::{PluginError, PluginResult};
use plugboard_plugin::PluginRegistry;
use plugin_samples::{CLOCK_PLUGIN_ID, ClockPlugin, TALLY_PLUGIN_ID, TallyPlugin};

fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config) {
        tracing::error!(error = %e, "Host error");
        std::process::exit(1);
    }
}

/// Load configuration from `config/default`, the environment overlay, and env vars
fn load_configuration() -> PluginResult<PlugboardConfig> {
    let env = std::env::var("PLUGBOARD_ENV").unwrap_or_else(|_| "development".to_string());
    PlugboardConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &PlugboardConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Register the sample plugins and drive them
fn run(config: PlugboardConfig) -> PluginResult<()> {
    tracing::info!("Starting Plugboard host v{}", env!("CARGO_PKG_VERSION"));

    let registry = PluginRegistry::new(config.registry);
    let ids = plugin_samples::register_all(&registry)?;
    tracing::info!(plugins = ids.len(), "Sample plugins registered");

    let report = registry.flush_connections()?;
    tracing::info!(connected = report.connected, "Connections established");

    let clock: Arc<ClockPlugin> = instance(&registry, CLOCK_PLUGIN_ID)?;
    let tally: Arc<TallyPlugin> = instance(&registry, TALLY_PLUGIN_ID)?;

    for amount in [1, 2, 3] {
        let results = serde_json::Value::Array(clock.tick(amount)?);
        tracing::info!(amount = amount, results = %results, "Tick delivered");
    }
    tally.nudge(4)?;

    let total = clock.read_total()?;
    tracing::info!(total = total, ticks = clock.ticks(), "Tally read through proxy");

    registry.clear();
    tracing::info!("Plugboard host shut down");
    Ok(())
}

/// Look up a registered plugin's concrete instance
fn instance<T: std::any::Any + Send + Sync>(
    registry: &PluginRegistry,
    id: &str,
) -> PluginResult<Arc<T>> {
    let plugin = registry.lookup(id)?;
    plugin.downcast::<T>().ok_or_else(|| {
        PluginError::id(
            plugin.name(),
            format!("Plugin {id} is not a {}", std::any::type_name::<T>()),
        )
    })
}
