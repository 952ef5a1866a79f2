//! Capability-scoped plugin proxies.
//!
//! A [`PluginProxy`] is the only cross-plugin reference a plugin can hold.
//! It exposes the target's hooks and nothing else: no descriptor fields,
//! no instance state. Hooks are resolved on every access, so a proxy sees
//! hooks created (or re-created) after it was handed out.

use std::fmt;
use std::sync::{Arc, Weak};

use serde_json::Value;

use plugboard_core::{PluginError, PluginId, PluginResult};

use crate::hooks::HookHandle;
use crate::registry::{PluginRegistry, resolve_id};

/// Restricted view of another plugin.
#[derive(Clone)]
pub struct PluginProxy {
    registry: Weak<PluginRegistry>,
    /// Plugin the proxy was handed to, for error reports.
    caller: String,
    target: PluginId,
}

impl PluginProxy {
    pub(crate) fn connect(
        registry: &Arc<PluginRegistry>,
        caller: &str,
        target: &str,
    ) -> PluginResult<Self> {
        let target = resolve_id(target, caller)?;
        if registry.get(target).is_none() {
            return Err(PluginError::id(
                caller,
                format!("No plugin found with ID: {target}"),
            ));
        }

        Ok(Self {
            registry: Arc::downgrade(registry),
            caller: caller.to_string(),
            target,
        })
    }

    /// Id of the plugin behind the proxy.
    pub fn target(&self) -> PluginId {
        self.target
    }

    /// Resolves a hook on the target.
    ///
    /// Anything that is not one of the target's hooks is a `Method` error.
    pub fn resolve_hook(&self, hook_name: &str) -> PluginResult<HookHandle> {
        let registry = self.registry()?;
        let plugin = registry.get(self.target).ok_or_else(|| self.unknown_target())?;

        registry
            .find_hook(self.target, hook_name)
            .ok_or_else(|| {
                PluginError::method(
                    &self.caller,
                    format!(
                        "Plugin {}:{} has no such method: {hook_name}",
                        self.target,
                        plugin.name()
                    ),
                )
            })
    }

    /// Resolves `hook_name` and invokes it with `args`.
    pub fn call(&self, hook_name: &str, args: &[Value]) -> PluginResult<Vec<Value>> {
        self.resolve_hook(hook_name)?.invoke(args)
    }

    /// Sorted hook names the target currently exposes.
    pub fn hook_names(&self) -> PluginResult<Vec<String>> {
        self.registry()?
            .hook_names_of(self.target)
            .ok_or_else(|| self.unknown_target())
    }

    fn registry(&self) -> PluginResult<Arc<PluginRegistry>> {
        self.registry.upgrade().ok_or_else(|| self.unknown_target())
    }

    fn unknown_target(&self) -> PluginError {
        PluginError::id(
            &self.caller,
            format!("No plugin found with ID: {}", self.target),
        )
    }
}

impl fmt::Debug for PluginProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginProxy")
            .field("caller", &self.caller)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
