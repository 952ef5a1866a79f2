//! Clock plugin: fires `on_tick`.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use plugboard_plugin::prelude::*;

use crate::tally::{TALLY_PLUGIN_ID, TOTAL};

/// Clock plugin id.
pub const CLOCK_PLUGIN_ID: &str = "6f9619ff-8b86-4d01-b42d-00cf4fc964ff";

/// Hook fired on every tick, with the tick amount as its only argument.
pub const ON_TICK: &str = "on_tick";

/// Emits ticks to whoever subscribed to `on_tick`.
#[derive(Debug)]
pub struct ClockPlugin {
    ctx: PluginContext,
    on_tick: HookHandle,
    ticks: AtomicU64,
}

impl PluginType for ClockPlugin {
    fn descriptor() -> DescriptorAttributes {
        plugin_descriptor!(
            id: CLOCK_PLUGIN_ID,
            name: "Clock",
            version: (1, 0, 0),
            author: "Plugboard Team",
            description: "Fires on_tick for every tick",
        )
    }

    fn create(ctx: &PluginContext) -> PluginResult<Self> {
        Ok(Self {
            ctx: ctx.clone(),
            on_tick: ctx.create_hook(ON_TICK)?,
            ticks: AtomicU64::new(0),
        })
    }
}

impl ClockPlugin {
    /// Fires `on_tick` with `amount` and returns the subscribers' results.
    pub fn tick(&self, amount: u64) -> PluginResult<Vec<Value>> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(tick = tick, amount = amount, "Clock tick");
        self.on_tick.invoke(&[json!(amount)])
    }

    /// Number of ticks fired so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Reads the tally plugin's running total through a proxy.
    pub fn read_total(&self) -> PluginResult<u64> {
        let tally = self.ctx.connect_plugin(TALLY_PLUGIN_ID)?;
        let values = tally.call(TOTAL, &[])?;
        values.first().and_then(Value::as_u64).ok_or_else(|| {
            PluginError::method(
                self.ctx.name(),
                format!("Hook '{TOTAL}' returned no total: {values:?}"),
            )
        })
    }
}
