//! Plugin types and declarations.
//!
//! A [`PluginDeclaration`] is what the registry admits: the declaring type
//! name, its raw descriptor attributes, and a factory that builds the one
//! instance. Compiled-in plugins implement [`PluginType`] and are declared
//! with [`PluginDeclaration::of`]; manifest-driven plugins pair a manifest
//! with a factory closure.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use plugboard_core::PluginResult;

use crate::context::PluginContext;
use crate::descriptor::{DescriptorAttributes, PluginDescriptor, validate_descriptor};

/// A registered plugin instance.
pub type PluginInstance = Arc<dyn Any + Send + Sync>;

/// Builds a plugin instance. Runs once, during registration.
pub type PluginFactory = Box<dyn FnOnce(&PluginContext) -> PluginResult<PluginInstance> + Send>;

/// Static side of a compiled-in plugin.
pub trait PluginType: Send + Sync + Sized + 'static {
    /// Declaring type name; must end with `Plugin`.
    ///
    /// Defaults to the last path segment of the Rust type name.
    fn type_name() -> &'static str {
        short_type_name::<Self>()
    }

    /// Raw descriptor attributes, usually built with `plugin_descriptor!`.
    fn descriptor() -> DescriptorAttributes;

    /// Builds the plugin instance.
    ///
    /// This is the plugin body: create hooks with
    /// [`PluginContext::create_hook`] and request subscriptions with
    /// [`PluginContext::connect_hook`]. Keep the context to use
    /// [`PluginContext::connect_plugin`] later.
    fn create(ctx: &PluginContext) -> PluginResult<Self>;
}

/// A plugin awaiting registration.
pub struct PluginDeclaration {
    /// Declaring type name.
    type_name: String,
    /// Raw descriptor attributes.
    attributes: DescriptorAttributes,
    /// Instance factory.
    factory: PluginFactory,
}

impl PluginDeclaration {
    /// Creates a declaration from its parts.
    pub fn new<F, T>(type_name: impl Into<String>, attributes: DescriptorAttributes, factory: F) -> Self
    where
        F: FnOnce(&PluginContext) -> PluginResult<T> + Send + 'static,
        T: Any + Send + Sync,
    {
        Self {
            type_name: type_name.into(),
            attributes,
            factory: Box::new(move |ctx: &PluginContext| {
                factory(ctx).map(|plugin| Arc::new(plugin) as PluginInstance)
            }),
        }
    }

    /// Declares a compiled-in plugin type.
    pub fn of<P: PluginType>() -> Self {
        Self::new(P::type_name(), P::descriptor(), P::create)
    }

    /// Declaring type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Raw descriptor attributes.
    pub fn attributes(&self) -> &DescriptorAttributes {
        &self.attributes
    }

    /// Runs the descriptor validator without registering anything.
    pub fn validate(&self) -> PluginResult<PluginDescriptor> {
        validate_descriptor(&self.type_name, &self.attributes)
    }

    pub(crate) fn into_parts(self) -> (String, DescriptorAttributes, PluginFactory) {
        (self.type_name, self.attributes, self.factory)
    }
}

impl fmt::Debug for PluginDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDeclaration")
            .field("type_name", &self.type_name)
            .field("attributes", &self.attributes)
            .field("factory", &"<closure>")
            .finish()
    }
}

/// Last path segment of a type name, without generic arguments.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
