// ABOUTME: Canvas module - the capability interface to the host canvas,
// ABOUTME: its UI-thread dispatcher, object model, documents, and layout.

mod capability;
mod catalog;
mod dispatcher;
mod document;
pub mod layout;
mod memory;
mod model;

pub use capability::*;
pub use catalog::*;
pub use dispatcher::*;
pub use document::*;
pub use memory::*;
pub use model::*;
