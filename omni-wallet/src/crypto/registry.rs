//! Curve and address-encoding registry
//!
//! One static description per protocol: which curve it signs with, how a
//! BIP-44 coordinate maps onto a derivation path, and how a public key becomes
//! an address. Everything here is pure data and pure functions.

use crate::error::{Error, Result};
use crate::protocol::Protocol;
use super::encoding::{self, STRKEY_ACCOUNT_ID};
use super::keys::{bip32, ChildIndex, DerivationPath, HdPath, PublicKey};

pub use super::keys::Curve;

/// BIP-44 purpose
pub const BIP44_PURPOSE: u32 = 44;

/// How a public key is turned into an address or account id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressScheme {
    /// Pay-to-pubkey-hash, base58check with a network version byte
    P2pkh { mainnet: u8, testnet: u8 },
    /// Keccak-256 of the uncompressed key, EIP-55 checksummed hex
    EvmChecksum,
    /// hash160 account id, base58check over the ripple alphabet
    RippleAccount,
    /// StrKey account id (`G…`)
    StellarStrKey,
    /// Raw public key, base58
    Base58PublicKey,
}

impl AddressScheme {
    /// Encode a public key as an address
    pub fn encode(&self, public_key: &PublicKey, testnet: bool) -> Result<String> {
        let expected = match self {
            Self::StellarStrKey | Self::Base58PublicKey => Curve::Ed25519,
            _ => Curve::Secp256k1,
        };
        if public_key.curve() != expected {
            return Err(Error::InvalidKeyMaterial(format!(
                "Address scheme {:?} expects a {:?} key",
                self, expected
            )));
        }

        match self {
            Self::P2pkh { mainnet, testnet: testnet_version } => {
                let version = if testnet { *testnet_version } else { *mainnet };
                Ok(encoding::base58check_encode(
                    version,
                    &encoding::hash160(public_key.as_bytes()),
                    bs58::Alphabet::BITCOIN,
                ))
            }
            Self::EvmChecksum => encoding::evm_address(&bip32::uncompress(public_key)?),
            Self::RippleAccount => Ok(encoding::base58check_encode(
                0x00,
                &encoding::hash160(public_key.as_bytes()),
                bs58::Alphabet::RIPPLE,
            )),
            Self::StellarStrKey => Ok(encoding::strkey_encode(STRKEY_ACCOUNT_ID, public_key.as_bytes())),
            Self::Base58PublicKey => Ok(bs58::encode(public_key.as_bytes()).into_string()),
        }
    }
}

/// Which BIP-44 levels a protocol's derivation path uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathLayout {
    /// `m/44'/coin'/account'/change/index`
    Bip44,
    /// `m/44'/coin'/account'`
    AccountOnly,
    /// `m/44'/coin'/account'/change'`
    HardenedAccountChange,
}

/// Static description of a protocol's keys and addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolDescriptor {
    pub protocol: Protocol,
    pub curve: Curve,
    pub purpose: u32,
    pub coin_type: u32,
    /// Coin type on test networks, where it differs
    pub testnet_coin_type: Option<u32>,
    pub layout: PathLayout,
    pub address_scheme: AddressScheme,
    /// Whether addresses can be derived from an extended public key
    pub public_derivation: bool,
}

const fn evm(protocol: Protocol, coin_type: u32) -> ProtocolDescriptor {
    ProtocolDescriptor {
        protocol,
        curve: Curve::Secp256k1,
        purpose: BIP44_PURPOSE,
        coin_type,
        testnet_coin_type: None,
        layout: PathLayout::Bip44,
        address_scheme: AddressScheme::EvmChecksum,
        public_derivation: true,
    }
}

static REGISTRY: [ProtocolDescriptor; 10] = [
    ProtocolDescriptor {
        protocol: Protocol::Bitcoin,
        curve: Curve::Secp256k1,
        purpose: BIP44_PURPOSE,
        coin_type: 0,
        testnet_coin_type: Some(1),
        layout: PathLayout::Bip44,
        address_scheme: AddressScheme::P2pkh { mainnet: 0x00, testnet: 0x6f },
        public_derivation: true,
    },
    ProtocolDescriptor {
        protocol: Protocol::Hathor,
        curve: Curve::Secp256k1,
        purpose: BIP44_PURPOSE,
        coin_type: 280,
        testnet_coin_type: None,
        layout: PathLayout::Bip44,
        address_scheme: AddressScheme::P2pkh { mainnet: 0x28, testnet: 0x49 },
        public_derivation: false,
    },
    evm(Protocol::Ethereum, 60),
    evm(Protocol::Bsc, 60),
    evm(Protocol::Celo, 52752),
    evm(Protocol::Polygon, 60),
    evm(Protocol::AvalancheC, 60),
    ProtocolDescriptor {
        protocol: Protocol::Ripple,
        curve: Curve::Secp256k1,
        purpose: BIP44_PURPOSE,
        coin_type: 144,
        testnet_coin_type: None,
        layout: PathLayout::Bip44,
        address_scheme: AddressScheme::RippleAccount,
        public_derivation: false,
    },
    ProtocolDescriptor {
        protocol: Protocol::Stellar,
        curve: Curve::Ed25519,
        purpose: BIP44_PURPOSE,
        coin_type: 148,
        testnet_coin_type: None,
        layout: PathLayout::AccountOnly,
        address_scheme: AddressScheme::StellarStrKey,
        public_derivation: false,
    },
    ProtocolDescriptor {
        protocol: Protocol::Solana,
        curve: Curve::Ed25519,
        purpose: BIP44_PURPOSE,
        coin_type: 501,
        testnet_coin_type: None,
        layout: PathLayout::HardenedAccountChange,
        address_scheme: AddressScheme::Base58PublicKey,
        public_derivation: false,
    },
];

/// Look up the description of a protocol
pub fn describe(protocol: Protocol) -> Result<&'static ProtocolDescriptor> {
    REGISTRY
        .iter()
        .find(|d| d.protocol == protocol)
        .ok_or_else(|| Error::UnsupportedProtocol(format!("No key description registered for {}", protocol)))
}

impl ProtocolDescriptor {
    pub fn coin_type(&self, testnet: bool) -> u32 {
        match (testnet, self.testnet_coin_type) {
            (true, Some(coin)) => coin,
            _ => self.coin_type,
        }
    }

    /// Full path of the key at `path`
    pub fn key_path(&self, path: &DerivationPath, testnet: bool) -> Result<HdPath> {
        path.validate()?;

        let mut indices = vec![
            ChildIndex::Hardened(self.purpose),
            ChildIndex::Hardened(self.coin_type(testnet)),
            ChildIndex::Hardened(path.account),
        ];
        match self.layout {
            PathLayout::Bip44 => {
                indices.push(ChildIndex::Normal(path.change));
                indices.push(ChildIndex::Normal(path.address_index));
            }
            PathLayout::AccountOnly => {}
            PathLayout::HardenedAccountChange => indices.push(ChildIndex::Hardened(path.change)),
        }

        Ok(HdPath::new(indices))
    }

    /// Path of the extended public key whose children are address indices
    pub fn extended_key_path(&self, path: &DerivationPath, testnet: bool) -> Result<Option<HdPath>> {
        if !self.public_derivation {
            return Ok(None);
        }
        Ok(Some(self.key_path(path, testnet)?.parent(1)))
    }

    pub fn encode_address(&self, public_key: &PublicKey, testnet: bool) -> Result<String> {
        self.address_scheme.encode(public_key, testnet)
    }
}
