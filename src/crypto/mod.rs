//! Cryptographic primitives for request signing and verification.

pub mod digest;
pub mod freshness;
pub mod nonce;
pub mod signer;
pub mod signing;
