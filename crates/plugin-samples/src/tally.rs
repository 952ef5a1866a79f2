//! Tally plugin: sums the clock's ticks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use plugboard_plugin::prelude::*;

use crate::clock::{CLOCK_PLUGIN_ID, ON_TICK};

/// Tally plugin id.
pub const TALLY_PLUGIN_ID: &str = "1c6f4b8e-2d9a-4e3b-a7c5-0f8e9d2b6a41";

/// Hook returning the current total.
pub const TOTAL: &str = "total";

/// Keeps a running total of tick amounts.
#[derive(Debug)]
pub struct TallyPlugin {
    ctx: PluginContext,
    total: Arc<AtomicU64>,
}

impl PluginType for TallyPlugin {
    fn descriptor() -> DescriptorAttributes {
        plugin_descriptor!(
            id: TALLY_PLUGIN_ID,
            name: "Tally",
            version: (1, 0, 0),
            author: "Plugboard Team",
            description: "Sums clock ticks and exposes the total",
        )
    }

    fn create(ctx: &PluginContext) -> PluginResult<Self> {
        let total = Arc::new(AtomicU64::new(0));

        let counter = Arc::clone(&total);
        ctx.connect_hook(
            CLOCK_PLUGIN_ID,
            ON_TICK,
            Handler::new(move |args| {
                let amount: u64 = arg(args, 0)?;
                Ok(json!(counter.fetch_add(amount, Ordering::SeqCst) + amount))
            }),
        )?;

        // Our own hook needs no queueing.
        let reader = Arc::clone(&total);
        ctx.create_hook(TOTAL)?.add_handler(
            ctx.id(),
            ctx.name(),
            Handler::new(move |_| Ok(json!(reader.load(Ordering::SeqCst)))),
        );

        Ok(Self {
            ctx: ctx.clone(),
            total,
        })
    }
}

impl TallyPlugin {
    /// Current total.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    /// Asks the clock to tick through a proxy.
    pub fn nudge(&self, amount: u64) -> PluginResult<Vec<Value>> {
        self.ctx
            .connect_plugin(CLOCK_PLUGIN_ID)?
            .call(ON_TICK, &[json!(amount)])
    }
}
