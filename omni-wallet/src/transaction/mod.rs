//! Token transaction construction
//!
//! Request and payload types, per-protocol encoders, and the collaborator
//! traits that carry transactions and queries across the network boundary.

pub mod types;
pub mod provider;
pub mod validation;
mod encoder;
mod ethereum;
mod hathor;
mod solana;

pub use types::*;
pub use provider::*;
pub use encoder::*;
pub use ethereum::*;
pub use hathor::*;
pub use solana::*;
