// ABOUTME: LLM module - the completion capability tools call into.
// ABOUTME: Defines types, the client trait, conversations, and providers.

mod client;
mod conversation;
mod openai;
mod parse;
mod scripted;
mod types;

pub use client::*;
pub use conversation::*;
pub use openai::*;
pub use parse::*;
pub use scripted::*;
pub use types::*;
