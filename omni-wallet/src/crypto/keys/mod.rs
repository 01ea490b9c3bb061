//! Key derivation and management
//!
//! secp256k1 keys follow BIP-32, ed25519 keys follow SLIP-10.

pub mod bip32;
pub mod slip10;
mod derivation;

pub use derivation::*;
