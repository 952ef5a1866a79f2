//! The context handed to a plugin while it is being built.
//!
//! Everything a plugin body may do goes through here: create its own
//! hooks, request subscriptions to other plugins' hooks, and obtain
//! proxies. The context is cheap to clone; plugins that need proxies
//! after construction keep a copy.
//!
//! Contexts hold the registry weakly. Instances stored in the registry
//! keep their contexts, so a strong reference would keep the registry
//! alive forever. Once the registry is dropped every operation fails
//! with an `Id` error.

use std::fmt;
use std::sync::{Arc, Weak};

use plugboard_core::{PluginError, PluginId, PluginResult};

use crate::hooks::{Handler, HookHandle};
use crate::proxy::PluginProxy;
use crate::registry::PluginRegistry;

/// A plugin's view of the registry.
#[derive(Clone)]
pub struct PluginContext {
    registry: Weak<PluginRegistry>,
    id: PluginId,
    name: String,
    registration: u64,
}

impl PluginContext {
    pub(crate) fn new(
        registry: Weak<PluginRegistry>,
        id: PluginId,
        name: String,
        registration: u64,
    ) -> Self {
        Self {
            registry,
            id,
            name,
            registration,
        }
    }

    /// Id of the plugin this context belongs to.
    pub fn id(&self) -> PluginId {
        self.id
    }

    /// Name of the plugin this context belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a hook owned by this plugin.
    ///
    /// Re-creating an existing name replaces the hook and drops its
    /// subscribers.
    pub fn create_hook(&self, hook_name: &str) -> PluginResult<HookHandle> {
        self.registry()?.create_hook(self, hook_name)
    }

    /// Requests that `handler` be subscribed to `hook_name` on `target`.
    ///
    /// The target plugin and hook must already exist. The handler is
    /// attached on the next [`PluginRegistry::flush_connections`] after
    /// this plugin's registration completes.
    pub fn connect_hook(
        &self,
        target: impl fmt::Display,
        hook_name: &str,
        handler: Handler,
    ) -> PluginResult<()> {
        self.registry()?
            .request_connection(self, &target.to_string(), hook_name, handler)
    }

    /// Returns a proxy exposing only the hooks of `target`.
    pub fn connect_plugin(&self, target: impl fmt::Display) -> PluginResult<PluginProxy> {
        PluginProxy::connect(&self.registry()?, &self.name, &target.to_string())
    }

    pub(crate) fn registration(&self) -> u64 {
        self.registration
    }

    fn registry(&self) -> PluginResult<Arc<PluginRegistry>> {
        self.registry
            .upgrade()
            .ok_or_else(|| PluginError::id(&self.name, "Plugin registry has been dropped"))
    }
}

impl fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginContext")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("registration", &self.registration)
            .finish_non_exhaustive()
    }
}
