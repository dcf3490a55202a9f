//! Inbound adapters that turn user input into session service calls.
//!
//! The terminal client in [`cli`] is the only surface; it plays the part of
//! page composition, so guards and redirects are observable from a shell.

pub mod cli;
