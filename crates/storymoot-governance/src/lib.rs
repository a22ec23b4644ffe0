//! Storymoot — session-scoped governance bounded context.
//!
//! Rule masters create story sessions, enroll participants, and raise
//! proposals; participants cast one ballot each, and proposals close on
//! full participation, on a rule master's say, or after their deadline.

pub mod application;
pub mod domain;
