//! Secret generation, hashing and comparison primitives.
//!
//! Plaintext secrets exist only in the value returned by
//! [`secret::generate`]; everything the gate stores is a [`digest::HashDigest`].

pub mod compare;
pub mod digest;
pub mod secret;
