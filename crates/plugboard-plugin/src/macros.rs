//! Convenience macros for plugin development.

/// Builds [`DescriptorAttributes`](crate::descriptor::DescriptorAttributes)
/// from `key: value` pairs.
///
/// Values are converted with `serde_json::to_value`, so tuples become
/// arrays. Nothing is validated here; registration runs the validator.
///
/// # Example
/// ```rust,ignore
/// let attributes = plugin_descriptor!(
///     id: "4f1e2d3c-5b6a-4789-8abc-def012345678",
///     name: "Greeter",
///     version: (1, 0, 0),
///     author: "Dev",
///     description: "Says hello",
/// );
/// ```
#[macro_export]
macro_rules! plugin_descriptor {
    ( $( $key:ident : $value:expr ),* $(,)? ) => {{
        let mut attributes = $crate::descriptor::DescriptorAttributes::new();
        $(
            attributes.insert(
                stringify!($key).to_string(),
                $crate::__private::serde_json::to_value(&$value)
                    .unwrap_or($crate::__private::serde_json::Value::Null),
            );
        )*
        attributes
    }};
}
