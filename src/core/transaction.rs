//! Transaction handling for the ledger
//!
//! Implements a UTXO-based transaction model with digital signatures.
//! A transaction spends a set of previous outputs, creates new ones, and
//! carries the sender's signature over the (inputs, outputs) encoding plus
//! the public key needed to check it. Transactions are immutable once
//! constructed; their identity is the digest of the canonical encoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::hash::sha256_hex;
use crate::crypto::keys::{verify_payload, KeyError, KeyPair};

/// Transaction input: a reference to the output being spent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionInput {
    /// Transaction ID of the previous transaction
    pub tx_id: String,
    /// Index of the output in the previous transaction
    pub output_index: u32,
}

/// Transaction output: a new spendable value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionOutput {
    /// Amount of coins
    pub amount: u64,
    /// Recipient's address (hash of public key)
    pub recipient: String,
}

impl TransactionOutput {
    /// Check if this output belongs to the given address
    pub fn is_owned_by(&self, address: &str) -> bool {
        self.recipient == address
    }
}

/// Unspent Transaction Output, the record a spender selects inputs from.
/// Selection and balance accounting live with the wallet collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UTXO {
    pub tx_id: String,
    pub output_index: u32,
    pub output: TransactionOutput,
}

/// A signed ledger transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    /// Outputs being spent
    pub inputs: Vec<TransactionInput>,
    /// Newly created outputs
    pub outputs: Vec<TransactionOutput>,
    /// Hex compact ECDSA signature over the (inputs, outputs) payload
    pub signature: String,
    /// Sender's compressed public key, hex encoded
    pub public_key: String,
    /// Creation timestamp
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Create and sign a new transaction
    pub fn new(
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
        key_pair: &KeyPair,
    ) -> Result<Self, KeyError> {
        let signature = key_pair.sign(&signing_payload_of(&inputs, &outputs))?;
        Ok(Self {
            inputs,
            outputs,
            signature,
            public_key: key_pair.public_key_hex(),
            timestamp: Utc::now(),
        })
    }

    /// The byte encoding the signature covers: inputs and outputs only.
    pub fn signing_payload(&self) -> Vec<u8> {
        signing_payload_of(&self.inputs, &self.outputs)
    }

    /// Canonical string encoding of the whole transaction.
    ///
    /// `tx{in=<inputs>|out=<outputs>|sig=<sig>|pk=<pubkey>|ts=<millis>}`
    /// with inputs as `tx_id:index` and outputs as `recipient:amount`,
    /// comma separated. The layout is part of the digest format; changing
    /// it invalidates every previously computed hash.
    pub fn canonical(&self) -> String {
        format!(
            "tx{{in={}|out={}|sig={}|pk={}|ts={}}}",
            encode_inputs(&self.inputs),
            encode_outputs(&self.outputs),
            self.signature,
            self.public_key,
            self.timestamp.timestamp_millis()
        )
    }

    /// Transaction identity: digest of the canonical encoding
    pub fn hash(&self) -> String {
        sha256_hex(self.canonical().as_bytes())
    }

    /// Re-derive the signing payload and check the attached signature
    pub fn verify_signature(&self) -> Result<bool, KeyError> {
        verify_payload(&self.public_key, &self.signing_payload(), &self.signature)
    }

    /// Whether any output pays the given address
    pub fn touches(&self, address: &str) -> bool {
        self.outputs.iter().any(|o| o.is_owned_by(address))
    }
}

fn encode_inputs(inputs: &[TransactionInput]) -> String {
    inputs
        .iter()
        .map(|i| format!("{}:{}", i.tx_id, i.output_index))
        .collect::<Vec<_>>()
        .join(",")
}

fn encode_outputs(outputs: &[TransactionOutput]) -> String {
    outputs
        .iter()
        .map(|o| format!("{}:{}", o.recipient, o.amount))
        .collect::<Vec<_>>()
        .join(",")
}

fn signing_payload_of(inputs: &[TransactionInput], outputs: &[TransactionOutput]) -> Vec<u8> {
    format!("in={}|out={}", encode_inputs(inputs), encode_outputs(outputs)).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transaction(key_pair: &KeyPair) -> Transaction {
        Transaction::new(
            vec![TransactionInput {
                tx_id: "f".repeat(64),
                output_index: 0,
            }],
            vec![TransactionOutput {
                amount: 100,
                recipient: "recipient".to_string(),
            }],
            key_pair,
        )
        .unwrap()
    }

    #[test]
    fn test_signature_verifies() {
        let kp = KeyPair::generate();
        let tx = sample_transaction(&kp);
        assert!(tx.verify_signature().unwrap());
    }

    #[test]
    fn test_tampered_output_fails_verification() {
        let kp = KeyPair::generate();
        let mut tx = sample_transaction(&kp);
        tx.outputs[0].amount = 999;
        assert!(!tx.verify_signature().unwrap());
    }

    #[test]
    fn test_hash_is_stable() {
        let kp = KeyPair::generate();
        let tx = sample_transaction(&kp);
        assert_eq!(tx.hash(), tx.hash());
        assert_eq!(tx.hash().len(), 64);
    }

    #[test]
    fn test_hash_covers_all_fields() {
        let kp = KeyPair::generate();
        let tx = sample_transaction(&kp);
        let mut other = tx.clone();
        other.outputs[0].amount += 1;
        assert_ne!(tx.hash(), other.hash());
    }

    #[test]
    fn test_touches() {
        let kp = KeyPair::generate();
        let tx = sample_transaction(&kp);
        assert!(tx.touches("recipient"));
        assert!(!tx.touches("someone_else"));
    }
}
