//! Hook handlers: the callables plugins subscribe to other plugins' hooks.

use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Signature of a handler body.
pub type HandlerFn = dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync;

/// A cloneable hook handler.
///
/// Identity is pointer identity: clones of one `Handler` are the same
/// handler, two `Handler::new` calls with identical closures are not.
#[derive(Clone)]
pub struct Handler {
    func: Arc<HandlerFn>,
}

impl Handler {
    /// Wraps a closure as a handler.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// Calls the handler.
    pub fn call(&self, args: &[Value]) -> anyhow::Result<Value> {
        (self.func)(args)
    }

    /// Whether `other` is this same handler.
    pub fn same_as(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("func", &Arc::as_ptr(&self.func).cast::<()>())
            .finish()
    }
}

/// Deserializes the positional argument at `index`.
pub fn arg<T: DeserializeOwned>(args: &[Value], index: usize) -> anyhow::Result<T> {
    let value = args
        .get(index)
        .with_context(|| format!("missing argument {index} (got {})", args.len()))?;
    serde_json::from_value(value.clone()).with_context(|| format!("argument {index} has the wrong type"))
}
