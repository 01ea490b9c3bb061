//! Mnemonic phrase generation and handling

use bip39::Mnemonic;
use rand::{rngs::OsRng, RngCore};
use crate::error::{Error, Result};

/// Supported mnemonic strengths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MnemonicStrength {
    /// 12 words (128 bits)
    Words12,
    /// 24 words (256 bits)
    Words24,
}

impl MnemonicStrength {
    fn entropy_bytes(&self) -> usize {
        self.word_count() * 4 / 3
    }

    pub fn word_count(&self) -> usize {
        match self {
            Self::Words12 => 12,
            Self::Words24 => 24,
        }
    }
}

/// A BIP-39 seed (512 bits)
#[derive(Clone)]
pub struct Seed([u8; 64]);

impl Seed {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 64]> for Seed {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

// Seeds are key material; never print them.
impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Seed(..)")
    }
}

/// Fresh phrase from OS entropy; a 24-word phrase covers the full 256 bits
pub fn generate_mnemonic(strength: MnemonicStrength) -> Result<String> {
    let mut entropy = [0u8; 32];
    let entropy = &mut entropy[..strength.entropy_bytes()];
    OsRng.fill_bytes(entropy);

    Mnemonic::from_entropy(entropy)
        .map(|m| m.to_string())
        .map_err(|e| Error::Mnemonic(e.to_string()))
}

/// Validate a mnemonic phrase
pub fn validate_mnemonic(phrase: &str) -> Result<()> {
    Mnemonic::parse_normalized(phrase)
        .map(|_| ())
        .map_err(|e| Error::Mnemonic(e.to_string()))
}

/// Generate a seed from a mnemonic phrase and optional passphrase
pub fn mnemonic_to_seed(phrase: &str, passphrase: Option<&str>) -> Result<Seed> {
    let mnemonic = Mnemonic::parse_normalized(phrase)
        .map_err(|e| Error::Mnemonic(e.to_string()))?;

    Ok(Seed(mnemonic.to_seed(passphrase.unwrap_or(""))))
}
