//! Omni Wallet Core - multi-protocol key derivation and token transactions
//!
//! This library derives wallet key material for UTXO, EVM and account-based
//! protocols from one seed, and builds unsigned token transfer/mint
//! transactions, probing EVM token contracts for the interface they implement
//! before picking a parameter layout.

pub mod error;
pub mod config;
pub mod protocol;
pub mod crypto;
pub mod account;
pub mod transaction;
pub mod token;

// Re-export commonly used types for convenience
pub use error::{Error, Result};
pub use config::{Config, Environment};
pub use protocol::{Protocol, ProtocolFamily};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
