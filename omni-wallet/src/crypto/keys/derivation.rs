//! Common key derivation functionality

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use super::{bip32, slip10};

/// First hardened child index
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Elliptic curve a protocol signs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Curve {
    /// BIP-32 derivation, public child derivation available
    Secp256k1,
    /// SLIP-10 derivation, hardened children only
    Ed25519,
}

/// A private key on a specific curve
#[derive(Clone)]
pub struct PrivateKey {
    bytes: Vec<u8>,
    curve: Curve,
}

impl PrivateKey {
    pub fn new(bytes: Vec<u8>, curve: Curve) -> Self {
        Self { bytes, curve }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey").field("curve", &self.curve).finish_non_exhaustive()
    }
}

/// A public key on a specific curve
///
/// secp256k1 keys are stored compressed (33 bytes), ed25519 keys raw (32 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    bytes: Vec<u8>,
    curve: Curve,
}

impl PublicKey {
    pub fn new(bytes: Vec<u8>, curve: Curve) -> Self {
        Self { bytes, curve }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }
}

/// A key pair on a specific curve
#[derive(Debug, Clone)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    pub fn new(private_key: PrivateKey, public_key: PublicKey) -> Result<Self> {
        if private_key.curve() != public_key.curve() {
            return Err(Error::InvalidKeyMaterial("Key curve mismatch".to_string()));
        }
        Ok(Self { private_key, public_key })
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn curve(&self) -> Curve {
        self.private_key.curve()
    }
}

/// BIP-44 style coordinate of a wallet inside a seed's key tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivationPath {
    pub account: u32,
    pub change: u32,
    pub address_index: u32,
}

impl DerivationPath {
    pub fn new(account: u32, change: u32, address_index: u32) -> Self {
        Self { account, change, address_index }
    }

    /// Every coordinate must fit below the hardened offset
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("account", self.account),
            ("change", self.change),
            ("address index", self.address_index),
        ] {
            if value >= HARDENED_OFFSET {
                return Err(Error::InvalidDerivationPath(format!(
                    "{} index {} is out of range",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// One step of a BIP-32 / SLIP-10 path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildIndex {
    Normal(u32),
    Hardened(u32),
}

impl ChildIndex {
    /// Raw 32-bit index as serialised by BIP-32
    pub fn raw(&self) -> u32 {
        match self {
            Self::Normal(i) => *i,
            Self::Hardened(i) => i | HARDENED_OFFSET,
        }
    }

    pub fn is_hardened(&self) -> bool {
        matches!(self, Self::Hardened(_))
    }
}

/// A full derivation path such as `m/44'/60'/0'/0/0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdPath(Vec<ChildIndex>);

impl HdPath {
    pub fn new(indices: Vec<ChildIndex>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[ChildIndex] {
        &self.0
    }

    /// The path without its last `n` steps
    pub fn parent(&self, n: usize) -> Self {
        let keep = self.0.len().saturating_sub(n);
        Self(self.0[..keep].to_vec())
    }
}

impl fmt::Display for HdPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for index in &self.0 {
            match index {
                ChildIndex::Normal(i) => write!(f, "/{}", i)?,
                ChildIndex::Hardened(i) => write!(f, "/{}'", i)?,
            }
        }
        Ok(())
    }
}

impl FromStr for HdPath {
    type Err = Error;

    fn from_str(path: &str) -> Result<Self> {
        if path != "m" && !path.starts_with("m/") {
            return Err(Error::InvalidDerivationPath(format!("Invalid derivation path: {}", path)));
        }

        let mut result = Vec::new();
        for component in path.trim_start_matches('m').split('/') {
            if component.is_empty() {
                continue;
            }

            let hardened = component.ends_with('\'') || component.ends_with('h');
            let index = component
                .trim_end_matches(|c| c == '\'' || c == 'h')
                .parse::<u32>()
                .map_err(|_| Error::InvalidDerivationPath(format!("Invalid derivation path component: {}", component)))?;
            if index >= HARDENED_OFFSET {
                return Err(Error::InvalidDerivationPath(format!("Index out of range: {}", component)));
            }

            result.push(if hardened { ChildIndex::Hardened(index) } else { ChildIndex::Normal(index) });
        }

        Ok(Self(result))
    }
}

/// Derive a key pair from a seed on the given curve
pub fn derive_key_pair(seed: &[u8], curve: Curve, path: &HdPath) -> Result<KeyPair> {
    match curve {
        Curve::Secp256k1 => bip32::derive_secp256k1_key_pair(seed, path),
        Curve::Ed25519 => slip10::derive_ed25519_key_pair(seed, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_path() {
        let path: HdPath = "m/44'/60'/0'/0/7".parse().unwrap();
        assert_eq!(
            path.indices(),
            &[
                ChildIndex::Hardened(44),
                ChildIndex::Hardened(60),
                ChildIndex::Hardened(0),
                ChildIndex::Normal(0),
                ChildIndex::Normal(7),
            ]
        );
        assert_eq!(path.to_string(), "m/44'/60'/0'/0/7");
        assert_eq!(path.parent(1).to_string(), "m/44'/60'/0'/0");
        assert_eq!(ChildIndex::Hardened(44).raw(), 0x8000_002c);
    }

    #[test]
    fn test_reject_malformed_paths() {
        assert!(matches!("44'/0'".parse::<HdPath>(), Err(Error::InvalidDerivationPath(_))));
        assert!(matches!("m/abc".parse::<HdPath>(), Err(Error::InvalidDerivationPath(_))));
        assert!(matches!("m/2147483648".parse::<HdPath>(), Err(Error::InvalidDerivationPath(_))));
    }

    #[test]
    fn test_derivation_path_range() {
        assert!(DerivationPath::new(0, 1, 2).validate().is_ok());
        assert!(matches!(
            DerivationPath::new(HARDENED_OFFSET, 0, 0).validate(),
            Err(Error::InvalidDerivationPath(_))
        ));
        assert!(matches!(
            DerivationPath::new(0, 0, u32::MAX).validate(),
            Err(Error::InvalidDerivationPath(_))
        ));
    }
}
