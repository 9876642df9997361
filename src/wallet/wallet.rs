//! Wallet: the account collaborator
//!
//! Owns a key pair and builds fully formed, pre-signed transactions for
//! the pool. UTXO selection and balance accounting stay on this side of
//! the boundary; the miner independently re-verifies every signature it
//! receives.

use crate::core::transaction::{Transaction, TransactionInput, TransactionOutput, UTXO};
use crate::crypto::keys::{KeyError, KeyPair};

/// An account: key pair plus derived address
pub struct Wallet {
    key_pair: KeyPair,
    /// Optional label for the account
    pub label: Option<String>,
}

impl Wallet {
    /// Create a new wallet with a fresh key pair
    pub fn new() -> Self {
        Self {
            key_pair: KeyPair::generate(),
            label: None,
        }
    }

    /// Create a wallet with a label
    pub fn with_label(label: &str) -> Self {
        Self {
            key_pair: KeyPair::generate(),
            label: Some(label.to_string()),
        }
    }

    /// Get the wallet's address
    pub fn address(&self) -> String {
        self.key_pair.address()
    }

    /// Get the wallet's public key (hex)
    pub fn public_key(&self) -> String {
        self.key_pair.public_key_hex()
    }

    /// Build and sign a transfer spending the given outputs: `amount` to
    /// the recipient, any `change` back to this wallet.
    pub fn transfer(
        &self,
        spend: &[UTXO],
        recipient: &str,
        amount: u64,
        change: u64,
    ) -> Result<Transaction, KeyError> {
        let inputs = spend
            .iter()
            .map(|utxo| TransactionInput {
                tx_id: utxo.tx_id.clone(),
                output_index: utxo.output_index,
            })
            .collect();

        let mut outputs = vec![TransactionOutput {
            amount,
            recipient: recipient.to_string(),
        }];
        if change > 0 {
            outputs.push(TransactionOutput {
                amount: change,
                recipient: self.address(),
            });
        }

        Transaction::new(inputs, outputs, &self.key_pair)
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::sha256_hex;

    fn funding_utxo(owner: &Wallet, amount: u64) -> UTXO {
        UTXO {
            tx_id: sha256_hex(owner.address().as_bytes()),
            output_index: 0,
            output: TransactionOutput {
                amount,
                recipient: owner.address(),
            },
        }
    }

    #[test]
    fn test_transfer_is_signed_by_sender() {
        let alice = Wallet::new();
        let bob = Wallet::new();

        let tx = alice
            .transfer(&[funding_utxo(&alice, 100)], &bob.address(), 100, 0)
            .unwrap();

        assert_eq!(tx.public_key, alice.public_key());
        assert!(tx.verify_signature().unwrap());
    }

    #[test]
    fn test_transfer_with_change_pays_both_parties() {
        let alice = Wallet::new();
        let bob = Wallet::new();

        let tx = alice
            .transfer(&[funding_utxo(&alice, 100)], &bob.address(), 60, 40)
            .unwrap();

        assert_eq!(tx.outputs.len(), 2);
        assert!(tx.touches(&bob.address()));
        assert!(tx.touches(&alice.address()));
        assert_eq!(tx.outputs[1].amount, 40);
    }

    #[test]
    fn test_transfer_inputs_reference_spent_outputs() {
        let alice = Wallet::new();
        let utxo = funding_utxo(&alice, 100);

        let tx = alice.transfer(&[utxo.clone()], "addr", 100, 0).unwrap();

        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.inputs[0].tx_id, utxo.tx_id);
        assert_eq!(tx.inputs[0].output_index, utxo.output_index);
    }

    #[test]
    fn test_labeled_wallet() {
        let wallet = Wallet::with_label("producer-0");
        assert_eq!(wallet.label.as_deref(), Some("producer-0"));
    }
}
