//! # plugboard-plugin
//!
//! In-process plugin framework for Plugboard. Provides:
//!
//! - Descriptor validation for plugin types and manifest files
//! - A registry holding exactly one instance per plugin id
//! - Named hooks with ordered, fail-fast fan-out to subscribers
//! - Deferred hook connections applied by an explicit flush
//! - Capability-scoped proxies: plugins see each other's hooks only
//!
//! Plugins never receive the registry itself. Their body runs with a
//! [`PluginContext`], which is the whole of what a plugin may do.

pub mod connections;
pub mod context;
pub mod declaration;
pub mod descriptor;
pub mod hooks;
pub mod macros;
pub mod manifest;
pub mod prelude;
pub mod proxy;
pub mod registry;

pub use connections::FlushReport;
pub use context::PluginContext;
pub use declaration::{PluginDeclaration, PluginType};
pub use descriptor::{DescriptorAttributes, PluginDescriptor, PluginVersion, validate_descriptor};
pub use hooks::{Handler, Hook, HookHandle};
pub use manifest::{PluginManifest, discover_manifests};
pub use proxy::PluginProxy;
pub use registry::{PluginRegistry, RegisteredPlugin};

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
