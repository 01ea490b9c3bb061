//! Wallet key sets
//!
//! Derives the address, public key, private key and extended public key of a
//! wallet for any supported protocol, from a mnemonic, an extended public key
//! or a single private key.

use std::fmt;

use bitcoin::Network;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::crypto::encoding::{self, STRKEY_ACCOUNT_ID, STRKEY_SECRET_SEED};
use crate::crypto::keys::{bip32, derive_key_pair, slip10, DerivationPath, KeyPair, PublicKey};
use crate::crypto::mnemonic::{generate_mnemonic, mnemonic_to_seed, MnemonicStrength, Seed};
use crate::crypto::registry::{describe, ProtocolDescriptor};
use crate::error::{Error, Result};
use crate::protocol::{Protocol, ProtocolFamily};

/// Keys and address of one wallet on one protocol
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletKeySet {
    pub protocol: Protocol,
    pub testnet: bool,
    pub address: String,
    pub public_key: String,
    /// Absent when derived from public material only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// Extended public key of the address level, on protocols that support
    /// public derivation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_public_key: Option<String>,
}

impl fmt::Debug for WalletKeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletKeySet")
            .field("protocol", &self.protocol)
            .field("testnet", &self.testnet)
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("extended_public_key", &self.extended_public_key)
            .finish()
    }
}

/// Secret or public root a wallet is derived from
#[derive(Clone)]
pub enum SeedMaterial {
    /// BIP-39 mnemonic with an optional passphrase
    Mnemonic { phrase: String, passphrase: Option<String> },
    /// Extended public key at the address level (`m/44'/coin'/account'/change`)
    ExtendedPublicKey(String),
}

impl SeedMaterial {
    pub fn mnemonic(phrase: impl Into<String>) -> Self {
        Self::Mnemonic { phrase: phrase.into(), passphrase: None }
    }
}

impl fmt::Debug for SeedMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mnemonic { .. } => f.write_str("Mnemonic(..)"),
            Self::ExtendedPublicKey(xpub) => f.debug_tuple("ExtendedPublicKey").field(xpub).finish(),
        }
    }
}

/// A freshly generated wallet together with its recovery phrase
#[derive(Debug, Clone)]
pub struct GeneratedWallet {
    pub keys: WalletKeySet,
    pub mnemonic: String,
}

/// Derive a wallet from seed material
///
/// From an extended public key only the address index of `path` is used; the
/// account and change levels are already fixed by the key itself.
pub fn derive_wallet(material: &SeedMaterial, protocol: Protocol, path: &DerivationPath, testnet: bool) -> Result<WalletKeySet> {
    match material {
        SeedMaterial::Mnemonic { phrase, passphrase } => {
            let seed = mnemonic_to_seed(phrase, passphrase.as_deref())?;
            derive_from_seed(&seed, protocol, path, testnet)
        }
        SeedMaterial::ExtendedPublicKey(xpub) => {
            path.validate()?;
            let descriptor = public_descriptor(protocol)?;
            let public_key = bip32::derive_public_child(xpub, path.address_index)?;

            debug!(%protocol, index = path.address_index, "derived wallet from extended public key");

            Ok(WalletKeySet {
                protocol,
                testnet,
                address: descriptor.encode_address(&public_key, testnet)?,
                public_key: format_public_key(descriptor, &public_key)?,
                private_key: None,
                extended_public_key: Some(xpub.trim().to_string()),
            })
        }
    }
}

/// Derive a wallet on the network the configured environment picks when
/// `testnet` is not given
pub fn derive_wallet_with_config(
    config: &Config,
    material: &SeedMaterial,
    protocol: Protocol,
    path: &DerivationPath,
    testnet: Option<bool>,
) -> Result<WalletKeySet> {
    derive_wallet(material, protocol, path, config.resolve_testnet(testnet))
}

/// Derive a wallet from a BIP-39 seed
pub fn derive_from_seed(seed: &Seed, protocol: Protocol, path: &DerivationPath, testnet: bool) -> Result<WalletKeySet> {
    let descriptor = describe(protocol)?;
    let key_path = descriptor.key_path(path, testnet)?;
    let key_pair = derive_key_pair(seed.as_bytes(), descriptor.curve, &key_path)?;

    let extended_public_key = match descriptor.extended_key_path(path, testnet)? {
        Some(parent) => Some(bip32::derive_extended_public_key(seed.as_bytes(), &parent, testnet)?),
        None => None,
    };

    debug!(%protocol, path = %key_path, testnet, "derived wallet from seed");

    let mut keys = key_set(descriptor, &key_pair, testnet)?;
    keys.extended_public_key = extended_public_key;
    Ok(keys)
}

/// Derive a wallet from a mnemonic phrase without a passphrase
pub fn derive_from_mnemonic(phrase: &str, protocol: Protocol, path: &DerivationPath, testnet: bool) -> Result<WalletKeySet> {
    derive_wallet(&SeedMaterial::mnemonic(phrase), protocol, path, testnet)
}

/// Rebuild the public half of a wallet from its private key
///
/// Accepted encodings follow what each protocol exports: WIF or hex for
/// Bitcoin, `0x` hex for EVM chains, an `S…` secret seed for Stellar, a base58
/// 64-byte keypair (or bare 32-byte secret) for Solana, hex elsewhere.
pub fn derive_from_private_key(private_key: &str, protocol: Protocol, testnet: bool) -> Result<WalletKeySet> {
    let descriptor = describe(protocol)?;
    let private_key = private_key.trim();

    let key_pair = match protocol {
        Protocol::Bitcoin => match bitcoin::PrivateKey::from_wif(private_key) {
            Ok(wif) => bip32::key_pair_from_secret(&wif.inner.secret_bytes())?,
            Err(_) => bip32::key_pair_from_secret(&decode_hex(private_key)?)?,
        },
        Protocol::Stellar => {
            let secret = encoding::strkey_decode(STRKEY_SECRET_SEED, private_key)?;
            slip10::key_pair_from_secret(&secret)?
        }
        Protocol::Solana => solana_key_pair(private_key)?,
        Protocol::Ripple => {
            let mut secret = decode_hex(private_key)?;
            // Ripple tooling prefixes secp256k1 secrets with 0x00
            if secret.len() == 33 && secret[0] == 0 {
                secret.remove(0);
            }
            bip32::key_pair_from_secret(&secret)?
        }
        _ => bip32::key_pair_from_secret(&decode_hex(private_key)?)?,
    };

    debug!(%protocol, testnet, "derived wallet from private key");

    key_set(descriptor, &key_pair, testnet)
}

/// Address at `index` below an extended public key, without any private material
pub fn derive_address_from_extended_public_key(xpub: &str, protocol: Protocol, index: u32, testnet: bool) -> Result<String> {
    let descriptor = public_descriptor(protocol)?;
    let public_key = bip32::derive_public_child(xpub, index)?;
    descriptor.encode_address(&public_key, testnet)
}

/// Generate a new 24-word mnemonic and the wallet at `path` below it
pub fn generate_wallet(protocol: Protocol, path: &DerivationPath, testnet: bool) -> Result<GeneratedWallet> {
    let mnemonic = generate_mnemonic(MnemonicStrength::Words24)?;
    let keys = derive_from_mnemonic(&mnemonic, protocol, path, testnet)?;
    Ok(GeneratedWallet { keys, mnemonic })
}

fn public_descriptor(protocol: Protocol) -> Result<&'static ProtocolDescriptor> {
    let descriptor = describe(protocol)?;
    if !descriptor.public_derivation {
        return Err(Error::UnsupportedProtocol(format!(
            "{} does not support derivation from an extended public key",
            protocol
        )));
    }
    Ok(descriptor)
}

fn key_set(descriptor: &ProtocolDescriptor, key_pair: &KeyPair, testnet: bool) -> Result<WalletKeySet> {
    Ok(WalletKeySet {
        protocol: descriptor.protocol,
        testnet,
        address: descriptor.encode_address(key_pair.public_key(), testnet)?,
        public_key: format_public_key(descriptor, key_pair.public_key())?,
        private_key: Some(format_private_key(descriptor, key_pair, testnet)?),
        extended_public_key: None,
    })
}

fn format_public_key(descriptor: &ProtocolDescriptor, public_key: &PublicKey) -> Result<String> {
    let bytes = public_key.as_bytes();
    Ok(match descriptor.protocol {
        Protocol::Stellar => encoding::strkey_encode(STRKEY_ACCOUNT_ID, bytes),
        Protocol::Solana => bs58::encode(bytes).into_string(),
        Protocol::Ripple => hex::encode_upper(bytes),
        p if p.family() == ProtocolFamily::Evm => format!("0x{}", hex::encode(bip32::uncompress(public_key)?)),
        _ => hex::encode(bytes),
    })
}

fn format_private_key(descriptor: &ProtocolDescriptor, key_pair: &KeyPair, testnet: bool) -> Result<String> {
    let secret = key_pair.private_key().as_bytes();
    Ok(match descriptor.protocol {
        Protocol::Bitcoin => {
            let network = if testnet { Network::Testnet } else { Network::Bitcoin };
            let secret_key = bitcoin::secp256k1::SecretKey::from_slice(secret)
                .map_err(|e| Error::InvalidKeyMaterial(e.to_string()))?;
            bitcoin::PrivateKey::new(secret_key, network).to_wif()
        }
        Protocol::Stellar => encoding::strkey_encode(STRKEY_SECRET_SEED, secret),
        Protocol::Solana => {
            let mut keypair = secret.to_vec();
            keypair.extend_from_slice(key_pair.public_key().as_bytes());
            bs58::encode(keypair).into_string()
        }
        Protocol::Ripple => hex::encode_upper(secret),
        p if p.family() == ProtocolFamily::Evm => format!("0x{}", hex::encode(secret)),
        _ => hex::encode(secret),
    })
}

fn solana_key_pair(private_key: &str) -> Result<KeyPair> {
    let bytes = bs58::decode(private_key)
        .into_vec()
        .map_err(|e| Error::InvalidKeyMaterial(format!("Invalid base58 private key: {}", e)))?;

    match bytes.len() {
        32 => slip10::key_pair_from_secret(&bytes),
        64 => {
            let key_pair = slip10::key_pair_from_secret(&bytes[..32])?;
            if key_pair.public_key().as_bytes() != &bytes[32..] {
                return Err(Error::InvalidKeyMaterial("Keypair public half does not match its secret".to_string()));
            }
            Ok(key_pair)
        }
        n => Err(Error::InvalidKeyMaterial(format!("Solana private key must be 32 or 64 bytes, got {}", n))),
    }
}

fn decode_hex(value: &str) -> Result<Vec<u8>> {
    hex::decode(value.trim_start_matches("0x"))
        .map_err(|e| Error::InvalidKeyMaterial(format!("Invalid hex private key: {}", e)))
}
