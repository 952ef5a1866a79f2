//! Sample plugins for Plugboard.
//!
//! [`ClockPlugin`] owns the `on_tick` hook. [`TallyPlugin`] subscribes to
//! it, keeps a running total, and exposes that total as its own `total`
//! hook. Together they exercise every capability a plugin has.

pub mod clock;
pub mod tally;

use std::sync::Arc;

use plugboard_core::{PluginId, PluginResult};
use plugboard_plugin::PluginRegistry;

pub use clock::{CLOCK_PLUGIN_ID, ClockPlugin, ON_TICK};
pub use tally::{TALLY_PLUGIN_ID, TOTAL, TallyPlugin};

/// Registers the sample plugins, clock first since tally connects to it.
///
/// Connections are left queued; call
/// [`PluginRegistry::flush_connections`] afterwards.
pub fn register_all(registry: &Arc<PluginRegistry>) -> PluginResult<Vec<PluginId>> {
    Ok(vec![
        registry.register::<ClockPlugin>()?,
        registry.register::<TallyPlugin>()?,
    ])
}
