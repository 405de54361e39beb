//! stax library - branch stack visualization
//!
//! This library exposes the pieces of the stax CLI for testing and embedding
//! purposes: config loading, stacking-tool invocation, graph snapshot
//! building, terminal rendering, the panel server, and the repository
//! watcher.

pub mod config;
pub mod data;
pub mod render;
pub mod serve;
pub mod tool;
pub mod watcher;
