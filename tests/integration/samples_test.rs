//! Sample plugins wired through the registry.

use plugboard_core::ErrorKind;
use plugin_samples::{
    CLOCK_PLUGIN_ID, ClockPlugin, ON_TICK, TALLY_PLUGIN_ID, TOTAL, TallyPlugin, register_all,
};
use serde_json::json;

use crate::helpers::registry;

#[test]
fn test_samples_tick_and_total() {
    let registry = registry();
    let ids = register_all(&registry).unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(registry.pending_connections(), 1);

    let report = registry.flush_connections().unwrap();
    assert_eq!(report.connected, 1);

    let clock = registry.lookup(CLOCK_PLUGIN_ID).unwrap().downcast::<ClockPlugin>().unwrap();
    let tally = registry.lookup(TALLY_PLUGIN_ID).unwrap().downcast::<TallyPlugin>().unwrap();

    assert_eq!(clock.tick(5).unwrap(), vec![json!(5)]);
    assert_eq!(clock.tick(10).unwrap(), vec![json!(15)]);
    assert_eq!(tally.nudge(1).unwrap(), vec![json!(16)]);
    assert_eq!(clock.read_total().unwrap(), 16);
    assert_eq!(tally.total(), 16);

    assert_eq!(registry.hook_names(CLOCK_PLUGIN_ID).unwrap(), vec![ON_TICK.to_string()]);
    assert_eq!(registry.hook_names(TALLY_PLUGIN_ID).unwrap(), vec![TOTAL.to_string()]);
}

#[test]
fn test_samples_register_once() {
    let registry = registry();
    register_all(&registry).unwrap();

    let err = register_all(&registry).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Id);
    assert_eq!(registry.count(), 2);
    assert_eq!(registry.pending_connections(), 1);
}

#[test]
fn test_clear_tears_everything_down() {
    let registry = registry();
    register_all(&registry).unwrap();
    registry.clear();

    assert_eq!(registry.count(), 0);
    assert_eq!(registry.pending_connections(), 0);
    assert_eq!(registry.lookup(CLOCK_PLUGIN_ID).unwrap_err().kind, ErrorKind::Id);
    assert_eq!(registry.flush_connections().unwrap().processed(), 0);
}
