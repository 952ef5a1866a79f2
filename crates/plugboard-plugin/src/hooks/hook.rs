//! Hooks: named broadcast endpoints owned by one plugin.
//!
//! Invocation is synchronous on the caller's thread. Subscribers run one
//! at a time in subscription order, and the first failing handler aborts
//! the remaining fan-out: the caller gets a `Handler` error and none of
//! the values already produced.

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, error, info};

use plugboard_core::{PluginError, PluginId, PluginResult};

use super::handler::Handler;

/// A plugin handler subscribed to a hook.
#[derive(Debug, Clone)]
struct Subscriber {
    /// Subscribing plugin.
    plugin_id: PluginId,
    /// Subscribing plugin's name, for error reports.
    plugin_name: String,
    /// The handler.
    handler: Handler,
}

/// A named endpoint that fans invocations out to its subscribers.
#[derive(Debug)]
pub struct Hook {
    /// Hook name.
    name: String,
    /// Plugin that created the hook.
    owner: PluginId,
    /// Owning plugin's name.
    owner_name: String,
    /// Subscribers in registration order.
    subscribers: Mutex<Vec<Subscriber>>,
}

impl Hook {
    /// Creates a hook with no subscribers.
    pub fn new(name: impl Into<String>, owner: PluginId, owner_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner,
            owner_name: owner_name.into(),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Hook name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning plugin id.
    pub fn owner(&self) -> PluginId {
        self.owner
    }

    /// Owning plugin name.
    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    /// Subscribes `handler` on behalf of `subscriber_id`.
    ///
    /// Returns `false` when that exact (subscriber, handler) pair is
    /// already subscribed; the hook is left unchanged.
    pub fn add_handler(
        &self,
        subscriber_id: PluginId,
        subscriber_name: impl Into<String>,
        handler: Handler,
    ) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());

        if subscribers
            .iter()
            .any(|s| s.plugin_id == subscriber_id && s.handler.same_as(&handler))
        {
            debug!(
                hook = %self.name,
                owner = %self.owner,
                subscriber = %subscriber_id,
                "Handler already subscribed"
            );
            return false;
        }

        let plugin_name = subscriber_name.into();
        info!(
            hook = %self.name,
            owner = %self.owner,
            subscriber = %subscriber_id,
            subscriber_name = %plugin_name,
            "Hook handler subscribed"
        );

        subscribers.push(Subscriber {
            plugin_id: subscriber_id,
            plugin_name,
            handler,
        });
        true
    }

    /// Number of subscribed handlers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Subscriber plugin ids in subscription order, one entry per handler.
    pub fn subscriber_ids(&self) -> Vec<PluginId> {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|s| s.plugin_id)
            .collect()
    }

    /// Calls every subscriber with `args` and collects their return values.
    pub fn invoke(&self, args: &[Value]) -> PluginResult<Vec<Value>> {
        // Snapshot so handlers can re-enter the registry or this hook.
        let subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        debug!(
            hook = %self.name,
            owner = %self.owner,
            subscriber_count = subscribers.len(),
            "Invoking hook"
        );

        let mut returns = Vec::with_capacity(subscribers.len());
        for subscriber in &subscribers {
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| subscriber.handler.call(args)));

            let detail = match outcome {
                Ok(Ok(value)) => {
                    returns.push(value);
                    continue;
                }
                Ok(Err(err)) => format!("{err:?}"),
                Err(payload) => format!("handler panicked: {}", panic_message(payload.as_ref())),
            };

            error!(
                hook = %self.name,
                owner = %self.owner,
                subscriber = %subscriber.plugin_id,
                subscriber_name = %subscriber.plugin_name,
                error = %detail,
                "Hook handler failed"
            );

            return Err(PluginError::handler(
                &subscriber.plugin_name,
                format!(
                    "An exception occurred in {}:{} ({}) by {}:{}\n\t{}",
                    self.name,
                    self.owner,
                    self.owner_name,
                    subscriber.plugin_name,
                    subscriber.plugin_id,
                    detail
                ),
            ));
        }

        Ok(returns)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Cloneable handle to a hook, returned by `create_hook` and proxy lookups.
#[derive(Debug, Clone)]
pub struct HookHandle(Arc<Hook>);

impl HookHandle {
    /// Whether both handles point at the same hook object.
    pub fn same_hook(&self, other: &HookHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Arc<Hook>> for HookHandle {
    fn from(hook: Arc<Hook>) -> Self {
        Self(hook)
    }
}

impl Deref for HookHandle {
    type Target = Hook;

    fn deref(&self) -> &Hook {
        &self.0
    }
}

impl fmt::Display for HookHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0.owner, self.0.name)
    }
}
