//! Token operations
//!
//! Capability probing of EVM token contracts, query routing for read-only
//! operations, and the dispatcher that ties validation, probing, encoding and
//! submission together.

pub mod capability;
pub mod query;
mod dispatcher;

pub use capability::CapabilityProber;
pub use query::{token_route, wallet_info_route, QueryRoute};
pub use dispatcher::*;
