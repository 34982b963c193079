//! In-process state for verifiers
//!
//! Token verification is stateless. The replay guard is an opt-in record of
//! already-presented tokens and the only shared mutable state in the crate.

mod replay;

pub use replay::{ReplayGuard, ReplayKey};
