// ABOUTME: Root module for hopper - agent tool providers for a node-based CAD canvas.
// ABOUTME: Re-exports the main public types from submodules.

pub mod canvas;
pub mod config;
pub mod error;
pub mod forum;
pub mod llm;
pub mod logging;
pub mod prelude;
pub mod tool;
pub mod tools;

pub use config::Config;
pub use error::HopperError;
