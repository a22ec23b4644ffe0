//! Domain model for the governance context.

pub mod access_control;
pub mod commands;
pub mod events;
pub mod proposals;
pub mod sessions;
pub mod voting;
