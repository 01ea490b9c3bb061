//! secp256k1 key derivation (BIP-32)
//!
//! Private and public (non-hardened) child derivation for Bitcoin, Hathor,
//! Ripple and every EVM protocol.

use std::str::FromStr;

use bitcoin::bip32::{ChildNumber, Xpriv, Xpub};
use bitcoin::Network;
use secp256k1::{PublicKey as Secp256k1PublicKey, Secp256k1, SecretKey};

use crate::error::{Error, Result};
use super::derivation::{ChildIndex, Curve, HdPath, KeyPair, PrivateKey, PublicKey};

/// Derive a secp256k1 key pair from a seed and derivation path
pub fn derive_secp256k1_key_pair(seed: &[u8], path: &HdPath) -> Result<KeyPair> {
    let xpriv = derive_xpriv(seed, path, Network::Bitcoin)?;
    key_pair_from_secret(&xpriv.private_key.secret_bytes())
}

/// Serialised extended public key at `path` (`xpub…`, or `tpub…` on testnet)
pub fn derive_extended_public_key(seed: &[u8], path: &HdPath, testnet: bool) -> Result<String> {
    let network = if testnet { Network::Testnet } else { Network::Bitcoin };
    let secp = Secp256k1::new();
    let xpriv = derive_xpriv(seed, path, network)?;
    Ok(Xpub::from_priv(&secp, &xpriv).to_string())
}

/// Derive the non-hardened child `index` of a serialised extended public key
///
/// Only public material is touched: the result cannot be turned back into a
/// private key.
pub fn derive_public_child(xpub: &str, index: u32) -> Result<PublicKey> {
    let secp = Secp256k1::verification_only();
    let parent = Xpub::from_str(xpub.trim())
        .map_err(|e| Error::InvalidKeyMaterial(format!("Invalid extended public key: {}", e)))?;
    let child = ChildNumber::from_normal_idx(index)
        .map_err(|e| Error::InvalidDerivationPath(format!("Invalid address index {}: {}", index, e)))?;
    let derived = parent
        .derive_pub(&secp, &[child])
        .map_err(|e| Error::InvalidKeyMaterial(format!("Public derivation failed: {}", e)))?;

    Ok(PublicKey::new(derived.public_key.serialize().to_vec(), Curve::Secp256k1))
}

/// Build a key pair from a raw 32-byte secret
pub fn key_pair_from_secret(secret: &[u8]) -> Result<KeyPair> {
    let secp = Secp256k1::new();
    let secret_key = SecretKey::from_slice(secret)
        .map_err(|e| Error::InvalidKeyMaterial(format!("Invalid secret key: {}", e)))?;
    let public_key = Secp256k1PublicKey::from_secret_key(&secp, &secret_key);

    let private_key = PrivateKey::new(secret_key.secret_bytes().to_vec(), Curve::Secp256k1);
    let public_key = PublicKey::new(public_key.serialize().to_vec(), Curve::Secp256k1);

    KeyPair::new(private_key, public_key)
}

/// Expand a compressed secp256k1 public key to its 65-byte form
pub fn uncompress(public_key: &PublicKey) -> Result<[u8; 65]> {
    if public_key.curve() != Curve::Secp256k1 {
        return Err(Error::InvalidKeyMaterial("Not a secp256k1 public key".to_string()));
    }
    let key = Secp256k1PublicKey::from_slice(public_key.as_bytes())
        .map_err(|e| Error::InvalidKeyMaterial(format!("Invalid secp256k1 public key: {}", e)))?;
    Ok(key.serialize_uncompressed())
}

fn derive_xpriv(seed: &[u8], path: &HdPath, network: Network) -> Result<Xpriv> {
    let secp = Secp256k1::new();
    let master = Xpriv::new_master(network, seed)
        .map_err(|e| Error::InvalidKeyMaterial(format!("Invalid seed: {}", e)))?;

    let children = path
        .indices()
        .iter()
        .map(|index| match index {
            ChildIndex::Normal(i) => ChildNumber::from_normal_idx(*i),
            ChildIndex::Hardened(i) => ChildNumber::from_hardened_idx(*i),
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::InvalidDerivationPath(e.to_string()))?;

    master
        .derive_priv(&secp, &children)
        .map_err(|e| Error::InvalidDerivationPath(format!("Derivation of {} failed: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // BIP-32 test vector 1
    const SEED: &str = "000102030405060708090a0b0c0d0e0f";

    #[test]
    fn test_bip32_vector_one() {
        let seed = hex::decode(SEED).unwrap();
        let master = derive_extended_public_key(&seed, &"m".parse().unwrap(), false).unwrap();
        assert_eq!(
            master,
            "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8"
        );

        let child = derive_extended_public_key(&seed, &"m/0'".parse().unwrap(), false).unwrap();
        assert_eq!(
            child,
            "xpub68Gmy5EdvgibQVfPdqkBBCHxA5htiqg55crXYuXoQRKfDBFA1WEjWgP6LHhwBZeNK1VTsfTFUHCdrfp1bgwQ9xv5ski8PX9rL2dZXvgGDnw"
        );
    }

    #[test]
    fn test_public_child_matches_private_child() {
        let seed = hex::decode(SEED).unwrap();
        let parent: HdPath = "m/44'/60'/0'/0".parse().unwrap();
        let xpub = derive_extended_public_key(&seed, &parent, false).unwrap();

        let from_xpub = derive_public_child(&xpub, 3).unwrap();
        let from_seed = derive_secp256k1_key_pair(&seed, &"m/44'/60'/0'/0/3".parse().unwrap()).unwrap();
        assert_eq!(&from_xpub, from_seed.public_key());
    }

    #[test]
    fn test_reject_bad_material() {
        assert!(matches!(derive_public_child("xpub-not-really", 0), Err(Error::InvalidKeyMaterial(_))));
        assert!(matches!(key_pair_from_secret(&[0u8; 32]), Err(Error::InvalidKeyMaterial(_))));
        assert!(matches!(key_pair_from_secret(&[1u8; 31]), Err(Error::InvalidKeyMaterial(_))));
    }
}
