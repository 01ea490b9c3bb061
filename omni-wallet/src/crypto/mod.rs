//! Cryptographic primitives and operations
//!
//! Mnemonic handling, hierarchical key derivation for secp256k1 and ed25519,
//! and the per-protocol curve and address-encoding registry.

pub mod mnemonic;
pub mod keys;
pub mod encoding;
pub mod registry;

pub use mnemonic::*;
pub use keys::*;
pub use registry::{describe, AddressScheme, PathLayout, ProtocolDescriptor};
