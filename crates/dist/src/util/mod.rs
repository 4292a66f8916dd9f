//! Shared utilities.
//!
//! Hashing for receipt digests and cross-platform test helpers.

pub mod hash;

#[cfg(test)]
pub mod testutil;
