// ABOUTME: Forum module - read-only access to the McNeel Discourse forum.
// ABOUTME: Used by the forum search, post, and summarize tools.

mod client;

pub use client::*;
