//! Hook creation, subscription, and fan-out.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, bail};
use plugboard_core::ErrorKind;
use plugboard_plugin::hooks::arg;
use plugboard_plugin::Handler;
use serde_json::{Value, json};

use crate::helpers::{context_of, fresh_id, register, registry};

#[test]
fn test_new_hook_returns_empty_results() {
    let registry = registry();
    let id = fresh_id();
    register(&registry, &id, "Fresh", |_| Ok(())).unwrap();

    let hook = context_of(&registry, &id).create_hook("x").unwrap();
    assert_eq!(hook.invoke(&[]).unwrap(), Vec::<Value>::new());
    assert_eq!(hook.invoke(&[json!(1), json!("two")]).unwrap(), Vec::<Value>::new());
}

#[test]
fn test_single_handler_result_is_one_element() {
    let registry = registry();
    let id = fresh_id();
    register(&registry, &id, "Math", |_| Ok(())).unwrap();
    let ctx = context_of(&registry, &id);

    let hook = ctx.create_hook("multiply").unwrap();
    hook.add_handler(
        ctx.id(),
        ctx.name(),
        Handler::new(|args| Ok(json!(arg::<i64>(args, 0)? * arg::<i64>(args, 1)?))),
    );

    assert_eq!(hook.invoke(&[json!(6), json!(7)]).unwrap(), vec![json!(42)]);
}

#[test]
fn test_same_pair_added_twice_runs_once() {
    let registry = registry();
    let id = fresh_id();
    register(&registry, &id, "Counter", |_| Ok(())).unwrap();
    let ctx = context_of(&registry, &id);

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let handler = Handler::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Value::Null)
    });

    let hook = ctx.create_hook("count").unwrap();
    assert!(hook.add_handler(ctx.id(), ctx.name(), handler.clone()));
    assert!(!hook.add_handler(ctx.id(), ctx.name(), handler));

    assert_eq!(hook.invoke(&[]).unwrap().len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failing_handler_reports_context_and_delivers_nothing() {
    let registry = registry();
    let owner = fresh_id();
    register(&registry, &owner, "Owner", |ctx| ctx.create_hook("on_save").map(drop)).unwrap();

    let good = fresh_id();
    let target = owner.clone();
    register(&registry, &good, "Good", move |ctx| {
        ctx.connect_hook(&target, "on_save", Handler::new(|_| Ok(json!("saved"))))
    })
    .unwrap();

    let bad = fresh_id();
    let target = owner.clone();
    register(&registry, &bad, "Bad", move |ctx| {
        ctx.connect_hook(
            &target,
            "on_save",
            Handler::new(|_| Err(anyhow!("disk full").context("writing snapshot"))),
        )
    })
    .unwrap();
    registry.flush_connections().unwrap();

    let err = registry.hook(&owner, "on_save").unwrap().invoke(&[]).unwrap_err();

    assert_eq!(err.kind, ErrorKind::Handler);
    assert_eq!(err.plugin, "Bad");
    assert!(err.message.contains("on_save"));
    assert!(err.message.contains(&owner.replace('-', "")));
    assert!(err.message.contains(&bad.replace('-', "")));
    assert!(err.message.contains("Bad"));
    assert!(err.message.contains("disk full"));
    assert!(err.to_string().starts_with("HANDLER: Plugin: Bad:"));
}

#[test]
fn test_panicking_handler_is_handler_error() {
    let registry = registry();
    let id = fresh_id();
    register(&registry, &id, "Fragile", |_| Ok(())).unwrap();
    let ctx = context_of(&registry, &id);

    let hook = ctx.create_hook("explode").unwrap();
    hook.add_handler(ctx.id(), ctx.name(), Handler::new(|_| panic!("index out of range")));

    let err = hook.invoke(&[]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Handler);
    assert!(err.message.contains("index out of range"));

    // The hook stays usable.
    assert_eq!(hook.subscriber_count(), 1);
}

#[test]
fn test_handler_argument_errors_surface() {
    let registry = registry();
    let id = fresh_id();
    register(&registry, &id, "Strict", |_| Ok(())).unwrap();
    let ctx = context_of(&registry, &id);

    let hook = ctx.create_hook("needs_number").unwrap();
    hook.add_handler(
        ctx.id(),
        ctx.name(),
        Handler::new(|args| {
            let n: u64 = arg(args, 0)?;
            if n == 0 {
                bail!("zero is not allowed");
            }
            Ok(json!(n))
        }),
    );

    assert_eq!(hook.invoke(&[json!(3)]).unwrap(), vec![json!(3)]);
    assert_eq!(hook.invoke(&[]).unwrap_err().kind, ErrorKind::Handler);
    assert_eq!(hook.invoke(&[json!("three")]).unwrap_err().kind, ErrorKind::Handler);
    assert!(hook.invoke(&[json!(0)]).unwrap_err().message.contains("zero"));
}

#[test]
fn test_fan_out_follows_subscription_order() {
    let registry = registry();
    let owner = fresh_id();
    register(&registry, &owner, "Bell", |ctx| ctx.create_hook("ring").map(drop)).unwrap();

    for label in ["first", "second", "third"] {
        let target = owner.clone();
        register(&registry, &fresh_id(), label, move |ctx| {
            ctx.connect_hook(&target, "ring", Handler::new(move |_| Ok(json!(label))))
        })
        .unwrap();
    }
    let report = registry.flush_connections().unwrap();
    assert_eq!(report.connected, 3);

    let hook = registry.hook(&owner, "ring").unwrap();
    assert_eq!(
        hook.invoke(&[]).unwrap(),
        vec![json!("first"), json!("second"), json!("third")]
    );
    assert_eq!(hook.subscriber_ids().len(), 3);
}
