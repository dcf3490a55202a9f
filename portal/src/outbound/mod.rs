//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http**: reqwest-backed gateway and health probe for the grading
//!   backend.
//! - **storage**: capability-scoped, atomically written session store.
//!
//! Adapters are thin translators between domain types and transport or
//! storage representations. They contain no session logic.

pub mod http;
pub mod storage;
