//! Cross-plugin proxies.

use plugboard_core::ErrorKind;
use plugboard_plugin::Handler;
use plugboard_plugin::hooks::arg;
use serde_json::json;

use crate::helpers::{context_of, fresh_id, register, registry};

#[test]
fn test_proxy_call_matches_direct_invoke() {
    let registry = registry();
    let target = fresh_id();
    register(&registry, &target, "Calculator", |ctx| {
        let hook = ctx.create_hook("add")?;
        hook.add_handler(
            ctx.id(),
            ctx.name(),
            Handler::new(|args| Ok(json!(arg::<i64>(args, 0)? + arg::<i64>(args, 1)?))),
        );
        Ok(())
    })
    .unwrap();

    let caller = fresh_id();
    register(&registry, &caller, "Caller", |_| Ok(())).unwrap();

    let proxy = context_of(&registry, &caller).connect_plugin(&target).unwrap();
    let args = [json!(2), json!(40)];
    let direct = registry.hook(&target, "add").unwrap().invoke(&args).unwrap();

    assert_eq!(proxy.call("add", &args).unwrap(), direct);
    assert_eq!(proxy.resolve_hook("add").unwrap().invoke(&args).unwrap(), vec![json!(42)]);
    assert!(proxy.resolve_hook("add").unwrap().same_hook(&registry.hook(&target, "add").unwrap()));
}

#[test]
fn test_proxy_exposes_only_hooks() {
    let registry = registry();
    let target = fresh_id();
    register(&registry, &target, "Private", |ctx| ctx.create_hook("public").map(drop)).unwrap();
    let caller = fresh_id();
    register(&registry, &caller, "Snoop", |_| Ok(())).unwrap();

    let proxy = context_of(&registry, &caller).connect_plugin(&target).unwrap();
    assert_eq!(proxy.hook_names().unwrap(), vec!["public".to_string()]);

    for member in ["name", "author", "description", "version", "id", "secret"] {
        let err = proxy.call(member, &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Method, "member {member}");
        assert_eq!(err.plugin, "Snoop");
        assert!(err.message.contains(&target.replace('-', "")));
    }
}

#[test]
fn test_connect_plugin_unknown_target() {
    let registry = registry();
    let caller = fresh_id();
    register(&registry, &caller, "Lonely", |_| Ok(())).unwrap();

    let err = context_of(&registry, &caller).connect_plugin(fresh_id()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Id);
}

#[test]
fn test_connect_plugin_during_creation() {
    let registry = registry();
    let target = fresh_id();
    register(&registry, &target, "Early", |ctx| {
        ctx.create_hook("hello")?
            .add_handler(ctx.id(), ctx.name(), Handler::new(|_| Ok(json!("hi"))));
        Ok(())
    })
    .unwrap();

    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&seen);
    let early = target.clone();
    register(&registry, &fresh_id(), "Greeter", move |ctx| {
        let values = ctx.connect_plugin(&early)?.call("hello", &[])?;
        sink.lock().unwrap().extend(values);
        Ok(())
    })
    .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![json!("hi")]);
}
