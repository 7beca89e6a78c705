//! In-memory state behind the gate.
//!
//! None of these types lock internally. The gate owns all three behind one
//! mutex so every read-modify-write sequence is atomic per call.

pub mod challenge;
pub mod lockout;
pub mod registry;
