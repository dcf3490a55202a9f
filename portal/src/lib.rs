//! Session and authorization core for the CScore grading portal client.
//!
//! The [`domain`] module owns the session model, sign-in orchestration,
//! role-based access policy, and route guards. Transport and persistence
//! live behind the ports in [`domain::ports`] and are implemented under
//! [`outbound`]. The terminal client in [`inbound::cli`] composes them.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
