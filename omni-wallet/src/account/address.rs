//! Address shape validation

use bitcoin::address::NetworkUnchecked;

use crate::crypto::encoding::{self, STRKEY_ACCOUNT_ID};
use crate::protocol::{Protocol, ProtocolFamily};

/// Hathor version bytes: P2PKH and P2SH, mainnet then testnet
const HATHOR_VERSIONS: [u8; 4] = [0x28, 0x64, 0x49, 0x87];

/// Check that an address is well-formed for a protocol
///
/// Checks encoding, length and checksum only; says nothing about whether the
/// account exists on chain.
pub fn validate_address(address: &str, protocol: Protocol) -> bool {
    match protocol {
        Protocol::Bitcoin => address.parse::<bitcoin::Address<NetworkUnchecked>>().is_ok(),
        Protocol::Hathor => matches!(
            encoding::base58check_decode(address, bs58::Alphabet::BITCOIN),
            Ok((version, payload)) if HATHOR_VERSIONS.contains(&version) && payload.len() == 20
        ),
        Protocol::Ripple => {
            address.starts_with('r')
                && matches!(
                    encoding::base58check_decode(address, bs58::Alphabet::RIPPLE),
                    Ok((0x00, payload)) if payload.len() == 20
                )
        }
        Protocol::Stellar => matches!(
            encoding::strkey_decode(STRKEY_ACCOUNT_ID, address),
            Ok(payload) if payload.len() == 32
        ),
        Protocol::Solana => matches!(
            bs58::decode(address).into_vec(),
            Ok(bytes) if bytes.len() == 32
        ),
        _ if protocol.family() == ProtocolFamily::Evm => is_evm_address(address),
        _ => false,
    }
}

fn is_evm_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(body) if body.len() == 40 => hex::decode(body).is_ok(),
        _ => false,
    }
}
