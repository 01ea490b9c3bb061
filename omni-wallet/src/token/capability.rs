//! ERC-165 capability probing
//!
//! Asks an EVM token contract, in a fixed order, which NFT interface it
//! implements. The first interface reported wins.

use std::sync::Arc;

use ethers::types::Bytes;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::protocol::Protocol;
use crate::transaction::validation;
use crate::transaction::{ContractParam, ContractReader, TokenCapability};

/// ERC-165 introspection method
pub const SUPPORTS_INTERFACE: &str = "supportsInterface(bytes4)";
/// ERC-721 interface id
pub const ERC721_INTERFACE_ID: [u8; 4] = [0x80, 0xac, 0x58, 0xcd];
/// ERC-1155 interface id
pub const ERC1155_INTERFACE_ID: [u8; 4] = [0xd9, 0xb6, 0x7a, 0x26];

/// Interfaces in probing order
const PROBES: [(TokenCapability, [u8; 4]); 2] = [
    (TokenCapability::NonFungibleUnique, ERC721_INTERFACE_ID),
    (TokenCapability::SemiFungible, ERC1155_INTERFACE_ID),
];

/// Classifies token contracts through a contract reader
#[derive(Clone)]
pub struct CapabilityProber {
    reader: Arc<dyn ContractReader>,
}

impl CapabilityProber {
    pub fn new(reader: Arc<dyn ContractReader>) -> Self {
        Self { reader }
    }

    /// Classify the token contract at `contract`
    ///
    /// Read failures are returned as `ProbeUnavailable`; they never turn into
    /// `Unknown`.
    pub async fn classify(&self, protocol: Protocol, contract: &str) -> Result<TokenCapability> {
        if !protocol.is_evm() {
            return Err(Error::UnsupportedProtocol(format!("Capability probing is not available on {}", protocol)));
        }
        validation::check_address(contract, "token", protocol)?;

        for (capability, interface_id) in PROBES {
            let params = [ContractParam::FixedBytes(Bytes::from(interface_id.to_vec()))];
            let supported = self
                .reader
                .call(protocol, contract, SUPPORTS_INTERFACE, &params)
                .await
                .map_err(|e| match e {
                    Error::ProbeUnavailable(_) | Error::Timeout(_) => e,
                    other => Error::ProbeUnavailable(other.to_string()),
                })?;

            debug!(%protocol, contract, interface = %hex::encode(interface_id), supported, "probed interface");
            if supported {
                info!(%protocol, contract, ?capability, "classified token contract");
                return Ok(capability);
            }
        }

        info!(%protocol, contract, "token contract reports no known interface");
        Ok(TokenCapability::Unknown)
    }
}
