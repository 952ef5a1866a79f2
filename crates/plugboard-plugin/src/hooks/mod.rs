//! Hook system: hooks, handles, and handlers.

pub mod handler;
pub mod hook;

pub use handler::{Handler, arg};
pub use hook::{Hook, HookHandle};
