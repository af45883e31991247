// ABOUTME: Tool module - the tool trait, registry, and invocation contract.
// ABOUTME: Core abstraction every tool provider plugs into.

mod capability;
mod context;
mod registry;
mod result;
pub mod schema;
mod traits;

pub use capability::*;
pub use context::*;
pub use registry::*;
pub use result::*;
pub use traits::*;

#[cfg(test)]
mod registry_test;
#[cfg(test)]
mod result_test;
#[cfg(test)]
mod schema_test;
