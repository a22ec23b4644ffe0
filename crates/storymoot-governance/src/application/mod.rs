//! Application layer: the engine facade and its command/query handlers.

pub mod command_handlers;
pub mod engine;
pub mod query_handlers;
