//! Storymoot Core — shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that the governance
//! context depends on: caller identity, time, commands, events, aggregates,
//! and the outbound notification port. It contains no transport code.

pub mod account;
pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod notification;
