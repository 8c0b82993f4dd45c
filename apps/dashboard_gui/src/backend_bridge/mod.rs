//! Backend bridge: command queue types and the worker thread that owns the async core.

pub mod commands;
pub mod runtime;
