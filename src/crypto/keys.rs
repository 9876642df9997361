//! ECDSA key management for the ledger
//!
//! Key pair generation, payload signing, and verification on the
//! secp256k1 curve. Signatures and public keys travel as hex strings, and
//! addresses are Base58Check(RIPEMD160(SHA256(pubkey))).

use rand::rngs::OsRng;
use ripemd::{Digest, Ripemd160};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::hash::sha256;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Malformed signature")]
    MalformedSignature,
    #[error("Secp256k1 error: {0}")]
    Secp256k1(#[from] secp256k1::Error),
}

/// A private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Get the public key as a hex string (compressed format)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// Derive the ledger address for this key pair
    pub fn address(&self) -> String {
        public_key_to_address(&self.public_key)
    }

    /// Sign an arbitrary payload; the payload is SHA-256 hashed first
    pub fn sign(&self, payload: &[u8]) -> Result<String, KeyError> {
        sign_payload(&self.secret_key, payload)
    }
}

/// Convert a public key to a ledger address.
/// Base58Check of RIPEMD160(SHA256(pubkey)) with a 0x00 version byte.
pub fn public_key_to_address(public_key: &PublicKey) -> String {
    let sha = sha256(&public_key.serialize());

    let mut ripemd = Ripemd160::new();
    ripemd.update(&sha);
    let ripemd_hash = ripemd.finalize();

    let mut address_bytes = vec![0x00];
    address_bytes.extend_from_slice(&ripemd_hash);

    // Checksum: first 4 bytes of double SHA-256
    let checksum = sha256(&sha256(&address_bytes));
    address_bytes.extend_from_slice(&checksum[..4]);

    bs58::encode(address_bytes).into_string()
}

/// Parse a compressed public key from its hex encoding
pub fn public_key_from_hex(hex_key: &str) -> Result<PublicKey, KeyError> {
    let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPublicKey)?;
    PublicKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPublicKey)
}

/// Sign a payload with a secret key; returns a hex compact signature
pub fn sign_payload(secret_key: &SecretKey, payload: &[u8]) -> Result<String, KeyError> {
    let secp = Secp256k1::new();
    let digest = sha256(payload);
    let message = Message::from_digest_slice(&digest)?;
    let signature = secp.sign_ecdsa(&message, secret_key);
    Ok(hex::encode(signature.serialize_compact()))
}

/// Verify a hex compact signature over a payload against a hex public key
pub fn verify_payload(
    public_key_hex: &str,
    payload: &[u8],
    signature_hex: &str,
) -> Result<bool, KeyError> {
    let public_key = public_key_from_hex(public_key_hex)?;
    let sig_bytes = hex::decode(signature_hex).map_err(|_| KeyError::MalformedSignature)?;
    let signature = secp256k1::ecdsa::Signature::from_compact(&sig_bytes)
        .map_err(|_| KeyError::MalformedSignature)?;

    let secp = Secp256k1::new();
    let digest = sha256(payload);
    let message = Message::from_digest_slice(&digest)?;

    Ok(secp.verify_ecdsa(&message, &signature, &public_key).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_pair_generation() {
        let kp = KeyPair::generate();
        assert!(!kp.public_key_hex().is_empty());
        assert!(!kp.address().is_empty());
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = KeyPair::generate();
        let payload = b"in=a:0|out=addr:100";

        let signature = kp.sign(payload).unwrap();
        assert!(verify_payload(&kp.public_key_hex(), payload, &signature).unwrap());
    }

    #[test]
    fn test_tampered_payload_fails() {
        let kp = KeyPair::generate();
        let signature = kp.sign(b"in=a:0|out=addr:100").unwrap();

        let ok = verify_payload(&kp.public_key_hex(), b"in=a:0|out=addr:999", &signature).unwrap();
        assert!(!ok);
    }

    #[test]
    fn test_wrong_key_fails() {
        let signer = KeyPair::generate();
        let other = KeyPair::generate();
        let signature = signer.sign(b"payload").unwrap();

        let ok = verify_payload(&other.public_key_hex(), b"payload", &signature).unwrap();
        assert!(!ok);
    }

    #[test]
    fn test_malformed_signature_rejected() {
        let kp = KeyPair::generate();
        assert!(matches!(
            verify_payload(&kp.public_key_hex(), b"payload", "zz"),
            Err(KeyError::MalformedSignature)
        ));
    }

    #[test]
    fn test_address_format() {
        let kp = KeyPair::generate();
        // Mainnet-style version byte encodes to a leading '1'
        assert!(kp.address().starts_with('1'));
    }
}
