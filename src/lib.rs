//! Interactive pub/sub dataflow execution engine.
//!
//! See `core::CoreApp` for the startup/shutdown orchestration and `api::server` for
//! the HTTP surface. The dataflow core itself lives in `message`, `topics`, `agents`,
//! `config_loader`, and `graph`.

pub mod agents;
pub mod api;
pub mod app;
pub mod config_loader;
pub mod core;
pub mod graph;
pub mod message;
pub mod topics;
pub mod utils;
