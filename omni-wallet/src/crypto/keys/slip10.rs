//! ed25519 key derivation (SLIP-10)
//!
//! SLIP-10 defines only hardened children for ed25519, so every step of the
//! path must be hardened and there is no public child derivation.

use ed25519_dalek::{SigningKey, VerifyingKey};
use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::error::{Error, Result};
use super::derivation::{ChildIndex, Curve, HdPath, KeyPair, PrivateKey, PublicKey};

type HmacSha512 = Hmac<Sha512>;

/// Derive an ed25519 key pair from a seed and derivation path
pub fn derive_ed25519_key_pair(seed: &[u8], path: &HdPath) -> Result<KeyPair> {
    let (mut secret_key, mut chain_code) = derive_master_key(seed)?;

    for component in path.indices() {
        if !component.is_hardened() {
            return Err(Error::InvalidDerivationPath(format!(
                "ed25519 derivation requires hardened indices: {}",
                path
            )));
        }
        (secret_key, chain_code) = derive_child_key(&secret_key, &chain_code, *component)?;
    }

    key_pair_from_secret(&secret_key)
}

/// Build a key pair from a raw 32-byte ed25519 secret
pub fn key_pair_from_secret(secret: &[u8]) -> Result<KeyPair> {
    let secret: [u8; 32] = secret
        .try_into()
        .map_err(|_| Error::InvalidKeyMaterial(format!("ed25519 secret must be 32 bytes, got {}", secret.len())))?;

    let signing_key = SigningKey::from_bytes(&secret);
    let verifying_key = VerifyingKey::from(&signing_key);

    let private_key = PrivateKey::new(signing_key.to_bytes().to_vec(), Curve::Ed25519);
    let public_key = PublicKey::new(verifying_key.to_bytes().to_vec(), Curve::Ed25519);

    KeyPair::new(private_key, public_key)
}

fn derive_master_key(seed: &[u8]) -> Result<([u8; 32], [u8; 32])> {
    let mut hmac = HmacSha512::new_from_slice(b"ed25519 seed")
        .map_err(|_| Error::InvalidKeyMaterial("HMAC error".to_string()))?;

    hmac.update(seed);
    Ok(split(&hmac.finalize().into_bytes()))
}

fn derive_child_key(parent_key: &[u8; 32], parent_chain_code: &[u8; 32], index: ChildIndex) -> Result<([u8; 32], [u8; 32])> {
    let mut hmac = HmacSha512::new_from_slice(parent_chain_code)
        .map_err(|_| Error::InvalidKeyMaterial("HMAC error".to_string()))?;

    // 0x00 || parent key || ser32(index)
    hmac.update(&[0u8]);
    hmac.update(parent_key);
    hmac.update(&index.raw().to_be_bytes());

    Ok(split(&hmac.finalize().into_bytes()))
}

fn split(output: &[u8]) -> ([u8; 32], [u8; 32]) {
    let mut key = [0u8; 32];
    let mut chain_code = [0u8; 32];
    key.copy_from_slice(&output[0..32]);
    chain_code.copy_from_slice(&output[32..64]);
    (key, chain_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    // SLIP-10 ed25519 test vector 1
    const SEED: &str = "000102030405060708090a0b0c0d0e0f";

    #[test]
    fn test_slip10_vector_one() {
        let seed = hex::decode(SEED).unwrap();

        let master = derive_ed25519_key_pair(&seed, &"m".parse().unwrap()).unwrap();
        assert_eq!(
            hex::encode(master.private_key().as_bytes()),
            "2b4be7f19ee27bbf30c667b642d5f4aa69fd169872f8fc3059c08ebae2eb19e7"
        );

        let child = derive_ed25519_key_pair(&seed, &"m/0'".parse().unwrap()).unwrap();
        assert_eq!(
            hex::encode(child.private_key().as_bytes()),
            "68e0fe46dfb67e368c75379acec591dad19df3cde26e63b93a8e704f1dade7a3"
        );
        assert_eq!(
            hex::encode(child.public_key().as_bytes()),
            "8c8a13df77a28f3445213a0f432fde644acaa215fc72dcdf300d5efaa85d350c"
        );
    }

    #[test]
    fn test_reject_normal_index() {
        let seed = hex::decode(SEED).unwrap();
        let result = derive_ed25519_key_pair(&seed, &"m/44'/501'/0".parse().unwrap());
        assert!(matches!(result, Err(Error::InvalidDerivationPath(_))));
    }
}
