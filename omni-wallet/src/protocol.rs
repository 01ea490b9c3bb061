//! Supported blockchain protocols

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Structural family of a protocol; decides which operations are legal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolFamily {
    /// Unspent-output ledgers (Bitcoin, Hathor)
    Utxo,
    /// EVM compatible chains
    Evm,
    /// Account-based chains without an EVM (Ripple, Stellar, Solana)
    Account,
}

/// Blockchain protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Bitcoin,
    Hathor,
    Ethereum,
    Bsc,
    Celo,
    Polygon,
    #[serde(rename = "avaxcchain")]
    AvalancheC,
    Ripple,
    Stellar,
    Solana,
}

impl Protocol {
    /// All protocols, in declaration order
    pub const ALL: [Protocol; 10] = [
        Protocol::Bitcoin,
        Protocol::Hathor,
        Protocol::Ethereum,
        Protocol::Bsc,
        Protocol::Celo,
        Protocol::Polygon,
        Protocol::AvalancheC,
        Protocol::Ripple,
        Protocol::Stellar,
        Protocol::Solana,
    ];

    /// The EVM compatible protocols
    pub const EVM: [Protocol; 5] = [
        Protocol::Ethereum,
        Protocol::Bsc,
        Protocol::Celo,
        Protocol::Polygon,
        Protocol::AvalancheC,
    ];

    pub fn family(&self) -> ProtocolFamily {
        match self {
            Self::Bitcoin | Self::Hathor => ProtocolFamily::Utxo,
            Self::Ethereum | Self::Bsc | Self::Celo | Self::Polygon | Self::AvalancheC => ProtocolFamily::Evm,
            Self::Ripple | Self::Stellar | Self::Solana => ProtocolFamily::Account,
        }
    }

    pub fn is_evm(&self) -> bool {
        self.family() == ProtocolFamily::Evm
    }

    /// Wire name, as used in query strings and configuration keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bitcoin => "bitcoin",
            Self::Hathor => "hathor",
            Self::Ethereum => "ethereum",
            Self::Bsc => "bsc",
            Self::Celo => "celo",
            Self::Polygon => "polygon",
            Self::AvalancheC => "avaxcchain",
            Self::Ripple => "ripple",
            Self::Stellar => "stellar",
            Self::Solana => "solana",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == name)
            .ok_or_else(|| Error::UnsupportedProtocol(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_protocol() {
        assert_eq!("ETHEREUM".parse::<Protocol>().unwrap(), Protocol::Ethereum);
        assert_eq!("avaxcchain".parse::<Protocol>().unwrap(), Protocol::AvalancheC);
        assert!(matches!("dogecoin".parse::<Protocol>(), Err(Error::UnsupportedProtocol(_))));
    }

    #[test]
    fn test_families() {
        assert!(Protocol::EVM.iter().all(Protocol::is_evm));
        assert_eq!(Protocol::Hathor.family(), ProtocolFamily::Utxo);
        assert_eq!(Protocol::Solana.family(), ProtocolFamily::Account);
    }

    #[test]
    fn test_serde_name_matches_wire_name() {
        for protocol in Protocol::ALL {
            let json = serde_json::to_string(&protocol).unwrap();
            assert_eq!(json, format!("\"{}\"", protocol.as_str()));
        }
    }
}
