//! Address and key encodings shared by the registry's address encoders

use bitcoin::hashes::{hash160, Hash};
use data_encoding::BASE32_NOPAD;
use ethers::types::Address;
use sha2::{Digest, Sha256};
use sha3::Keccak256;

use crate::error::{Error, Result};

/// Stellar StrKey version byte for an ed25519 account id (`G…`)
pub const STRKEY_ACCOUNT_ID: u8 = 6 << 3;
/// Stellar StrKey version byte for an ed25519 secret seed (`S…`)
pub const STRKEY_SECRET_SEED: u8 = 18 << 3;

/// RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    hash160::Hash::hash(data).to_byte_array()
}

fn checksum(data: &[u8]) -> [u8; 4] {
    let hash = Sha256::digest(Sha256::digest(data));
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Base58 with a 4-byte double-SHA256 checksum
pub fn base58check_encode(version: u8, payload: &[u8], alphabet: &bs58::Alphabet) -> String {
    let mut data = Vec::with_capacity(payload.len() + 5);
    data.push(version);
    data.extend_from_slice(payload);
    let check = checksum(&data);
    data.extend_from_slice(&check);
    bs58::encode(data).with_alphabet(alphabet).into_string()
}

/// Decode base58check, returning `(version, payload)`
pub fn base58check_decode(value: &str, alphabet: &bs58::Alphabet) -> Result<(u8, Vec<u8>)> {
    let data = bs58::decode(value)
        .with_alphabet(alphabet)
        .into_vec()
        .map_err(|e| Error::InvalidKeyMaterial(format!("Invalid base58: {}", e)))?;
    if data.len() < 5 {
        return Err(Error::InvalidKeyMaterial("base58check payload too short".to_string()));
    }

    let (body, check) = data.split_at(data.len() - 4);
    if checksum(body) != check {
        return Err(Error::InvalidKeyMaterial("base58check checksum mismatch".to_string()));
    }
    Ok((body[0], body[1..].to_vec()))
}

/// EIP-55 checksummed address of an uncompressed secp256k1 public key
pub fn evm_address(uncompressed_public_key: &[u8]) -> Result<String> {
    if uncompressed_public_key.len() != 65 {
        return Err(Error::InvalidKeyMaterial("Invalid uncompressed public key length".to_string()));
    }

    // Skip the 0x04 prefix and keep the last 20 bytes of the hash
    let hash = Keccak256::digest(&uncompressed_public_key[1..]);
    let address = Address::from_slice(&hash[12..]);
    Ok(ethers::utils::to_checksum(&address, None))
}

/// Stellar StrKey: base32(version || payload || crc16-xmodem little-endian)
pub fn strkey_encode(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + 3);
    data.push(version);
    data.extend_from_slice(payload);
    let crc = crc16_xmodem(&data);
    data.extend_from_slice(&crc.to_le_bytes());
    BASE32_NOPAD.encode(&data)
}

/// Decode a StrKey of the expected version into its payload
pub fn strkey_decode(version: u8, value: &str) -> Result<Vec<u8>> {
    let data = BASE32_NOPAD
        .decode(value.as_bytes())
        .map_err(|e| Error::InvalidKeyMaterial(format!("Invalid base32: {}", e)))?;
    if data.len() < 3 {
        return Err(Error::InvalidKeyMaterial("StrKey too short".to_string()));
    }

    let (body, crc) = data.split_at(data.len() - 2);
    if crc16_xmodem(body).to_le_bytes() != crc {
        return Err(Error::InvalidKeyMaterial("StrKey checksum mismatch".to_string()));
    }
    if body[0] != version {
        return Err(Error::InvalidKeyMaterial("Unexpected StrKey version".to_string()));
    }
    Ok(body[1..].to_vec())
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for byte in data {
        crc ^= (*byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x1021 } else { crc << 1 };
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_stellar_account() {
        let account = strkey_encode(STRKEY_ACCOUNT_ID, &[0u8; 32]);
        assert_eq!(account, "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF");
        assert_eq!(strkey_decode(STRKEY_ACCOUNT_ID, &account).unwrap(), vec![0u8; 32]);
        assert!(strkey_decode(STRKEY_SECRET_SEED, &account).is_err());
    }

    #[test]
    fn test_strkey_detects_corruption() {
        let account = strkey_encode(STRKEY_ACCOUNT_ID, &[7u8; 32]);
        let corrupted = format!("{}A", &account[..account.len() - 1]);
        assert!(strkey_decode(STRKEY_ACCOUNT_ID, &corrupted).is_err());
    }

    #[test]
    fn test_strkey_rejects_bad_base32() {
        assert!(strkey_decode(STRKEY_ACCOUNT_ID, "gaaaaaaa").is_err());
        assert!(strkey_decode(STRKEY_ACCOUNT_ID, "GAAAAAA1").is_err());
    }

    #[test]
    fn test_base58check_known_address() {
        // hash160 of the compressed generator point, version 0x00
        let payload = hex::decode("751e76e8199196d454941c45d1b3a323f1433bd6").unwrap();
        let address = base58check_encode(0x00, &payload, bs58::Alphabet::BITCOIN);
        assert_eq!(address, "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");

        let (version, decoded) = base58check_decode(&address, bs58::Alphabet::BITCOIN).unwrap();
        assert_eq!(version, 0x00);
        assert_eq!(decoded, payload);
    }
}
