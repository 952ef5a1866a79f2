//! Deferred hook connections.
//!
//! `connect_hook` does not touch the target hook. It checks that the
//! target plugin and hook exist and appends a [`ConnectionRequest`]; the
//! handler is attached when the registry flushes the queue. The check is
//! a pre-check only: if the target re-creates the hook before the flush,
//! the handler lands on the new hook object.

use serde::Serialize;

use plugboard_core::PluginId;

use crate::hooks::Handler;

/// A pending request to subscribe a handler to another plugin's hook.
#[derive(Debug, Clone)]
pub struct ConnectionRequest {
    /// Plugin asking to subscribe.
    pub source: PluginId,
    /// Name of the requesting plugin.
    pub source_name: String,
    /// Plugin owning the hook.
    pub target: PluginId,
    /// Hook on the target plugin.
    pub hook_name: String,
    /// Handler to attach.
    pub handler: Handler,
    /// Registration pass that queued the request.
    pub(crate) registration: u64,
}

/// Queue of connection requests waiting for a flush.
#[derive(Debug, Default)]
pub struct ConnectionQueue {
    /// Requests in arrival order.
    requests: Vec<ConnectionRequest>,
}

impl ConnectionQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request.
    pub fn push(&mut self, request: ConnectionRequest) {
        self.requests.push(request);
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether no request is pending.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Iterates pending requests in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &ConnectionRequest> {
        self.requests.iter()
    }

    /// Removes and returns every pending request.
    pub fn take(&mut self) -> Vec<ConnectionRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Drops every request queued by one registration pass.
    pub(crate) fn discard_registration(&mut self, registration: u64) -> usize {
        let before = self.requests.len();
        self.requests.retain(|r| r.registration != registration);
        before - self.requests.len()
    }

    /// Drops every pending request.
    pub fn clear(&mut self) {
        self.requests.clear();
    }
}

/// Outcome of a flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    /// Handlers newly attached.
    pub connected: usize,
    /// Requests whose (subscriber, handler) pair was already attached.
    pub already_subscribed: usize,
    /// Requests left queued because their plugin is still registering.
    pub deferred: usize,
}

impl FlushReport {
    /// Requests attached or found already attached.
    pub fn processed(&self) -> usize {
        self.connected + self.already_subscribed
    }
}
