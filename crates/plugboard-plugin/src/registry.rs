//! Plugin registry: admitted plugin instances, their hooks, and the
//! pending connection queue.
//!
//! One registry is created at process start and shared as an
//! `Arc<PluginRegistry>`. All mutable state (instances, hook maps,
//! connection queue) sits behind a single mutex. The lock is never held
//! while plugin code runs: factories and hook handlers execute unlocked,
//! so they may call back into the registry.
//!
//! Invariant: every id in the instance map also has a (possibly empty)
//! hook map. An id with a hook map but no instance is mid-registration.
//! Connection requests queued by a registration still in progress are
//! never attached; a flush leaves them queued until the registration
//! commits or is rolled back.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use plugboard_core::config::{DuplicatePolicy, RegistryConfig};
use plugboard_core::{ErrorKind, PluginError, PluginId, PluginResult};

use crate::connections::{ConnectionQueue, ConnectionRequest, FlushReport};
use crate::context::PluginContext;
use crate::declaration::{PluginDeclaration, PluginInstance, PluginType};
use crate::descriptor::{PluginDescriptor, validate_descriptor};
use crate::hooks::{Handler, Hook, HookHandle};

/// A registered plugin: its descriptor and the single instance.
#[derive(Clone)]
pub struct RegisteredPlugin {
    /// Validated descriptor.
    descriptor: Arc<PluginDescriptor>,
    /// The instance built by the plugin's factory.
    instance: PluginInstance,
    /// When registration completed.
    registered_at: DateTime<Utc>,
}

impl RegisteredPlugin {
    /// Plugin id.
    pub fn id(&self) -> PluginId {
        self.descriptor.id
    }

    /// Plugin name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Validated descriptor.
    pub fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    /// When registration completed.
    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// The type-erased instance.
    pub fn instance(&self) -> &PluginInstance {
        &self.instance
    }

    /// The instance as its concrete type, if it is a `T`.
    pub fn downcast<T: std::any::Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.instance).downcast::<T>().ok()
    }
}

impl fmt::Debug for RegisteredPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredPlugin")
            .field("descriptor", &self.descriptor)
            .field("registered_at", &self.registered_at)
            .finish_non_exhaustive()
    }
}

/// Mutable registry state, guarded by one mutex.
#[derive(Debug, Default)]
struct RegistryState {
    /// Plugin ID → registered plugin.
    instances: HashMap<PluginId, RegisteredPlugin>,
    /// Plugin ID → hook name → hook.
    hooks: HashMap<PluginId, HashMap<String, Arc<Hook>>>,
    /// Connection requests awaiting a flush.
    connections: ConnectionQueue,
    /// Counter tagging each registration pass.
    next_registration: u64,
    /// Registration passes whose factory has not finished yet.
    in_progress: HashSet<u64>,
}

/// An id reserved for an in-progress registration.
struct Reservation {
    id: PluginId,
    registration: u64,
    /// Hook map replaced by an overwriting registration.
    previous_hooks: Option<HashMap<String, Arc<Hook>>>,
}

/// Registry of all admitted plugins.
#[derive(Debug)]
pub struct PluginRegistry {
    /// Registry settings.
    config: RegistryConfig,
    /// Instances, hooks, and pending connections.
    state: Mutex<RegistryState>,
}

impl PluginRegistry {
    /// Creates a new empty registry.
    pub fn new(config: RegistryConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            state: Mutex::new(RegistryState::default()),
        })
    }

    /// Registry settings.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers a compiled-in plugin type.
    pub fn register<P: PluginType>(self: &Arc<Self>) -> PluginResult<PluginId> {
        self.register_declaration(PluginDeclaration::of::<P>())
    }

    /// Validates a declaration, builds its instance, and admits it.
    ///
    /// The plugin's hook map exists before the factory runs, so the factory
    /// can create hooks. If the factory fails, its hooks and any
    /// connections it queued are discarded and nothing stays registered.
    pub fn register_declaration(
        self: &Arc<Self>,
        declaration: PluginDeclaration,
    ) -> PluginResult<PluginId> {
        let (type_name, attributes, factory) = declaration.into_parts();
        let descriptor = validate_descriptor(&type_name, &attributes)?;
        let reservation = self.reserve(&descriptor)?;

        let ctx = PluginContext::new(
            Arc::downgrade(self),
            descriptor.id,
            descriptor.name.clone(),
            reservation.registration,
        );

        let instance = match factory(&ctx) {
            Ok(instance) => instance,
            Err(err) => {
                warn!(
                    plugin_id = %descriptor.id,
                    type_name = %type_name,
                    error = %err,
                    "Plugin construction failed, registration rolled back"
                );
                self.rollback(reservation);
                return Err(err);
            }
        };

        let id = descriptor.id;
        let plugin = RegisteredPlugin {
            descriptor: Arc::new(descriptor),
            instance,
            registered_at: Utc::now(),
        };

        let mut state = self.state();
        state.in_progress.remove(&reservation.registration);
        let hook_count = state.hooks.entry(id).or_default().len();
        info!(
            plugin_id = %id,
            name = %plugin.name(),
            version = %plugin.descriptor().version,
            author = %plugin.descriptor().author,
            hooks = hook_count,
            "Plugin registered"
        );
        state.instances.insert(id, plugin);

        Ok(id)
    }

    fn reserve(&self, descriptor: &PluginDescriptor) -> PluginResult<Reservation> {
        let mut state = self.state();
        let id = descriptor.id;

        if state.hooks.contains_key(&id) {
            match self.config.duplicate_ids {
                DuplicatePolicy::Reject => {
                    return Err(PluginError::id(
                        &descriptor.type_name,
                        format!("A plugin with ID {id} is already registered"),
                    ));
                }
                DuplicatePolicy::Overwrite => {
                    warn!(
                        plugin_id = %id,
                        type_name = %descriptor.type_name,
                        "Plugin ID already registered, overwriting earlier registration"
                    );
                }
            }
        }

        state.next_registration += 1;
        let registration = state.next_registration;
        state.in_progress.insert(registration);
        let previous_hooks = state.hooks.insert(id, HashMap::new());

        Ok(Reservation {
            id,
            registration,
            previous_hooks,
        })
    }

    fn rollback(&self, reservation: Reservation) {
        let mut state = self.state();
        state.in_progress.remove(&reservation.registration);
        match reservation.previous_hooks {
            Some(previous) => {
                state.hooks.insert(reservation.id, previous);
            }
            None => {
                state.hooks.remove(&reservation.id);
            }
        }
        let discarded = state
            .connections
            .discard_registration(reservation.registration);
        debug!(
            plugin_id = %reservation.id,
            discarded_connections = discarded,
            "Registration rolled back"
        );
    }

    /// Looks up a registered plugin by dashed or undashed id.
    pub fn lookup(&self, id: impl fmt::Display) -> PluginResult<RegisteredPlugin> {
        let raw = id.to_string();
        let plugin_id = resolve_id(&raw, &raw)?;
        self.get(plugin_id)
            .ok_or_else(|| PluginError::id(&raw, format!("No plugin found with ID: {plugin_id}")))
    }

    /// Whether a plugin with this id is registered.
    pub fn contains(&self, id: impl fmt::Display) -> bool {
        PluginId::parse(&id.to_string())
            .map(|plugin_id| self.state().instances.contains_key(&plugin_id))
            .unwrap_or(false)
    }

    /// Number of registered plugins.
    pub fn count(&self) -> usize {
        self.state().instances.len()
    }

    /// Descriptors of all registered plugins, sorted by name then id.
    pub fn list(&self) -> Vec<PluginDescriptor> {
        let mut descriptors: Vec<PluginDescriptor> = self
            .state()
            .instances
            .values()
            .map(|plugin| plugin.descriptor().clone())
            .collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        descriptors
    }

    /// Sorted hook names owned by a registered plugin.
    pub fn hook_names(&self, id: impl fmt::Display) -> PluginResult<Vec<String>> {
        let plugin = self.lookup(id)?;
        Ok(self.hook_names_of(plugin.id()).unwrap_or_default())
    }

    /// A hook owned by a registered plugin.
    pub fn hook(&self, id: impl fmt::Display, hook_name: &str) -> PluginResult<HookHandle> {
        let plugin = self.lookup(id)?;
        self.find_hook(plugin.id(), hook_name).ok_or_else(|| {
            PluginError::hook(
                plugin.name(),
                format!(
                    "No hook with name '{hook_name}' found on plugin with ID: {}",
                    plugin.id()
                ),
            )
        })
    }

    /// Number of connection requests waiting for a flush.
    pub fn pending_connections(&self) -> usize {
        self.state().connections.len()
    }

    /// Attaches every queued connection to its target hook and clears the queue.
    ///
    /// All-or-nothing: every request is resolved first. If one no longer
    /// resolves, the pass fails and the queue is left as it was. Flushing
    /// an empty queue is a no-op.
    ///
    /// Requests from a plugin whose registration is still running stay
    /// queued and are counted as `deferred`.
    pub fn flush_connections(&self) -> PluginResult<FlushReport> {
        let mut state = self.state();
        if state.connections.is_empty() {
            debug!("No pending connections to flush");
            return Ok(FlushReport::default());
        }

        let current: &RegistryState = &state;
        let hooks = current
            .connections
            .iter()
            .filter(|request| !current.in_progress.contains(&request.registration))
            .map(|request| {
                target_hook(
                    current,
                    &request.source_name,
                    request.target,
                    &request.hook_name,
                )
            })
            .collect::<PluginResult<Vec<Arc<Hook>>>>()?;

        let requests = state.connections.take();
        let (ready, deferred): (Vec<ConnectionRequest>, Vec<ConnectionRequest>) = requests
            .into_iter()
            .partition(|request| !state.in_progress.contains(&request.registration));

        let mut report = FlushReport {
            deferred: deferred.len(),
            ..FlushReport::default()
        };
        for request in deferred {
            state.connections.push(request);
        }
        drop(state);

        for (hook, request) in hooks.into_iter().zip(ready) {
            debug!(
                source = %request.source,
                target = %request.target,
                hook = %request.hook_name,
                "Creating connection"
            );
            if hook.add_handler(request.source, request.source_name, request.handler) {
                report.connected += 1;
            } else {
                report.already_subscribed += 1;
            }
        }

        info!(
            connected = report.connected,
            already_subscribed = report.already_subscribed,
            deferred = report.deferred,
            "Connection queue flushed"
        );
        Ok(report)
    }

    /// Tears the registry down: instances, hooks, and queue together.
    pub fn clear(&self) {
        let mut state = self.state();
        let plugins = state.instances.len();
        state.instances.clear();
        state.hooks.clear();
        state.connections.clear();
        state.in_progress.clear();
        info!(plugins = plugins, "Plugin registry cleared");
    }

    pub(crate) fn get(&self, id: PluginId) -> Option<RegisteredPlugin> {
        self.state().instances.get(&id).cloned()
    }

    pub(crate) fn find_hook(&self, id: PluginId, hook_name: &str) -> Option<HookHandle> {
        self.state()
            .hooks
            .get(&id)
            .and_then(|hooks| hooks.get(hook_name))
            .map(|hook| HookHandle::from(Arc::clone(hook)))
    }

    pub(crate) fn hook_names_of(&self, id: PluginId) -> Option<Vec<String>> {
        self.state().hooks.get(&id).map(|hooks| {
            let mut names: Vec<String> = hooks.keys().cloned().collect();
            names.sort();
            names
        })
    }

    /// Creates (or re-creates) a hook owned by the context's plugin.
    ///
    /// Re-creating a name replaces the hook object; subscribers of the
    /// old object are not carried over.
    pub(crate) fn create_hook(&self, ctx: &PluginContext, hook_name: &str) -> PluginResult<HookHandle> {
        if hook_name.is_empty() {
            return Err(PluginError::hook(ctx.name(), "Hook name must not be empty"));
        }

        let mut state = self.state();
        let hooks = state.hooks.get_mut(&ctx.id()).ok_or_else(|| {
            PluginError::id(ctx.name(), format!("No plugin found with ID: {}", ctx.id()))
        })?;

        let hook = Arc::new(Hook::new(hook_name, ctx.id(), ctx.name()));
        match hooks.insert(hook_name.to_string(), Arc::clone(&hook)) {
            Some(previous) => warn!(
                plugin_id = %ctx.id(),
                hook = %hook_name,
                dropped_subscribers = previous.subscriber_count(),
                "Hook re-created, existing subscribers dropped"
            ),
            None => info!(plugin_id = %ctx.id(), hook = %hook_name, "Hook created"),
        }

        Ok(HookHandle::from(hook))
    }

    /// Checks the target plugin and hook exist, then queues the request.
    pub(crate) fn request_connection(
        &self,
        ctx: &PluginContext,
        target: &str,
        hook_name: &str,
        handler: Handler,
    ) -> PluginResult<()> {
        let target = resolve_id(target, ctx.name())?;

        let mut state = self.state();
        target_hook(&state, ctx.name(), target, hook_name)?;

        state.connections.push(ConnectionRequest {
            source: ctx.id(),
            source_name: ctx.name().to_string(),
            target,
            hook_name: hook_name.to_string(),
            handler,
            registration: ctx.registration(),
        });

        debug!(
            source = %ctx.id(),
            target = %target,
            hook = %hook_name,
            pending = state.connections.len(),
            "Connection request queued"
        );
        Ok(())
    }
}

/// Parses a raw id, reporting failures as an unknown-plugin id error.
pub(crate) fn resolve_id(raw: &str, caller: &str) -> PluginResult<PluginId> {
    PluginId::parse(raw).map_err(|e| {
        PluginError::with_source(
            ErrorKind::Id,
            caller,
            format!("No plugin found with ID: {raw}"),
            e,
        )
    })
}

/// Resolves `hook_name` on a registered `target`, on behalf of `caller`.
fn target_hook(
    state: &RegistryState,
    caller: &str,
    target: PluginId,
    hook_name: &str,
) -> PluginResult<Arc<Hook>> {
    if !state.instances.contains_key(&target) {
        return Err(PluginError::id(
            caller,
            format!("No plugin found with ID: {target}"),
        ));
    }

    state
        .hooks
        .get(&target)
        .and_then(|hooks| hooks.get(hook_name))
        .cloned()
        .ok_or_else(|| {
            PluginError::hook(
                caller,
                format!("No hook with name '{hook_name}' found on plugin with ID: {target}"),
            )
        })
}
