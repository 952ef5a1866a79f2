//! Prelude for plugin authors.

pub use plugboard_core::{ErrorKind, PluginError, PluginId, PluginResult};
pub use serde_json::{Value, json};

pub use crate::context::PluginContext;
pub use crate::declaration::PluginType;
pub use crate::descriptor::DescriptorAttributes;
pub use crate::hooks::{Handler, HookHandle, arg};
pub use crate::proxy::PluginProxy;

pub use crate::plugin_descriptor;
