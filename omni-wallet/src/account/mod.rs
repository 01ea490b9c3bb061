//! Account key material
//!
//! Wallet key sets derived from seeds, private keys or extended public keys,
//! and address shape validation per protocol.

pub mod address;
mod wallet;

pub use address::validate_address;
pub use wallet::*;
