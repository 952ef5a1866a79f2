//! Deferred connections and flushing.

use plugboard_core::{ErrorKind, PluginError, PluginId, PluginResult};
use plugboard_plugin::descriptor::DescriptorAttributes;
use plugboard_plugin::hooks::arg;
use plugboard_plugin::{
    FlushReport, Handler, HookHandle, PluginContext, PluginType, plugin_descriptor,
};
use serde_json::{Value, json};

use crate::helpers::{context_of, fresh_id, overwriting_registry, register, registry};

const A_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";
const B_ID: &str = "16fd2706-8baf-433b-82eb-8c7fada847da";

/// Owns `onStart` and keeps the handle to fire it.
#[derive(Debug)]
struct StarterPlugin {
    on_start: HookHandle,
}

impl PluginType for StarterPlugin {
    fn descriptor() -> DescriptorAttributes {
        plugin_descriptor!(
            id: A_ID,
            name: "Starter",
            version: (1, 0, 0),
            author: "Integration Tests",
            description: "Fires onStart",
        )
    }

    fn create(ctx: &PluginContext) -> PluginResult<Self> {
        Ok(Self {
            on_start: ctx.create_hook("onStart")?,
        })
    }
}

impl StarterPlugin {
    fn on_start(&self, n: i64) -> PluginResult<Vec<Value>> {
        self.on_start.invoke(&[json!(n)])
    }
}

/// Adds one to whatever `onStart` carries.
#[derive(Debug)]
struct IncrementPlugin;

impl PluginType for IncrementPlugin {
    fn descriptor() -> DescriptorAttributes {
        plugin_descriptor!(
            id: B_ID,
            name: "Increment",
            version: (1, 0, 0),
            author: "Integration Tests",
            description: "Listens to onStart",
        )
    }

    fn create(ctx: &PluginContext) -> PluginResult<Self> {
        ctx.connect_hook(
            A_ID,
            "onStart",
            Handler::new(|args| Ok(json!(arg::<i64>(args, 0)? + 1))),
        )?;
        Ok(Self)
    }
}

#[test]
fn test_on_start_scenario() {
    let registry = registry();
    registry.register::<StarterPlugin>().unwrap();
    registry.register::<IncrementPlugin>().unwrap();

    let starter = registry
        .lookup(A_ID)
        .unwrap()
        .downcast::<StarterPlugin>()
        .unwrap();
    assert!(starter.on_start(41).unwrap().is_empty());

    registry.flush_connections().unwrap();
    assert_eq!(starter.on_start(41).unwrap(), vec![json!(42)]);
}

#[test]
fn test_connect_to_unregistered_target_is_id_error() {
    let registry = registry();
    let err = registry.register::<IncrementPlugin>().unwrap_err();

    assert_eq!(err.kind, ErrorKind::Id);
    assert_eq!(registry.pending_connections(), 0);
    assert!(!registry.contains(B_ID));
}

#[test]
fn test_connect_to_unknown_hook_is_hook_error() {
    let registry = registry();
    let target = fresh_id();
    register(&registry, &target, "Quiet", |_| Ok(())).unwrap();
    let source = fresh_id();
    register(&registry, &source, "Eager", |_| Ok(())).unwrap();

    let err = context_of(&registry, &source)
        .connect_hook(&target, "onStart", Handler::new(|_| Ok(Value::Null)))
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Hook);
    assert_eq!(err.plugin, "Eager");
    assert_eq!(registry.pending_connections(), 0);
}

#[test]
fn test_malformed_target_id_is_id_error() {
    let registry = registry();
    let source = fresh_id();
    register(&registry, &source, "Sloppy", |_| Ok(())).unwrap();

    let err = context_of(&registry, &source)
        .connect_hook("not-a-uuid", "anything", Handler::new(|_| Ok(Value::Null)))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Id);
    assert_eq!(registry.pending_connections(), 0);
}

#[test]
fn test_second_flush_is_noop() {
    let registry = registry();
    registry.register::<StarterPlugin>().unwrap();
    registry.register::<IncrementPlugin>().unwrap();

    assert_eq!(registry.flush_connections().unwrap().connected, 1);
    assert_eq!(registry.flush_connections().unwrap(), FlushReport::default());
    assert_eq!(registry.hook(A_ID, "onStart").unwrap().subscriber_count(), 1);
}

#[test]
fn test_connections_after_flush_need_another_flush() {
    let registry = registry();
    registry.register::<StarterPlugin>().unwrap();
    registry.flush_connections().unwrap();

    let late = fresh_id();
    register(&registry, &late, "Late", |ctx| {
        ctx.connect_hook(A_ID, "onStart", Handler::new(|_| Ok(json!("late"))))
    })
    .unwrap();

    let hook = registry.hook(A_ID, "onStart").unwrap();
    assert!(hook.invoke(&[json!(0)]).unwrap().is_empty());
    registry.flush_connections().unwrap();
    assert_eq!(hook.invoke(&[json!(0)]).unwrap(), vec![json!("late")]);
}

#[test]
fn test_failed_registration_discards_its_requests() {
    let registry = registry();
    registry.register::<StarterPlugin>().unwrap();

    let quitter = fresh_id();
    let err = register(&registry, &quitter, "Quitter", |ctx| {
        ctx.connect_hook(A_ID, "onStart", Handler::new(|_| Ok(json!("ghost"))))?;
        Err(PluginError::attribute(ctx.name(), "missing resource"))
    })
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Attribute);

    assert_eq!(registry.pending_connections(), 0);
    registry.flush_connections().unwrap();
    assert!(registry.hook(A_ID, "onStart").unwrap().invoke(&[json!(1)]).unwrap().is_empty());
}

#[test]
fn test_flush_is_all_or_nothing() {
    let registry = overwriting_registry();
    let stable = fresh_id();
    register(&registry, &stable, "Stable", |ctx| ctx.create_hook("ping").map(drop)).unwrap();
    let fickle = fresh_id();
    register(&registry, &fickle, "Fickle", |ctx| ctx.create_hook("ping").map(drop)).unwrap();

    let (to_stable, to_fickle) = (stable.clone(), fickle.clone());
    register(&registry, &fresh_id(), "Listener", move |ctx| {
        ctx.connect_hook(&to_stable, "ping", Handler::new(|_| Ok(json!("stable"))))?;
        ctx.connect_hook(&to_fickle, "ping", Handler::new(|_| Ok(json!("fickle"))))
    })
    .unwrap();

    // Re-registering drops Fickle's hooks before the flush.
    register(&registry, &fickle, "Fickle", |_| Ok(())).unwrap();

    let err = registry.flush_connections().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Hook);
    assert_eq!(registry.pending_connections(), 2);
    assert_eq!(registry.hook(&stable, "ping").unwrap().subscriber_count(), 0);
}

#[test]
fn test_duplicate_registration_rejected() {
    let registry = registry();
    let first: PluginId = registry.register::<StarterPlugin>().unwrap();
    let err = registry.register::<StarterPlugin>().unwrap_err();

    assert_eq!(err.kind, ErrorKind::Id);
    assert_eq!(registry.count(), 1);
    assert!(registry.contains(first));
}
