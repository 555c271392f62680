//! Built and signed transaction artifacts
//!
//! [`TxBuildOutput`] is a compiled message with empty signature slots.
//! Signing turns it into a [`SignedTransaction`], which may still be partial:
//! more keypairs can be added later and [`SignedTransaction::missing_signers`]
//! reports the gap. Submission refuses anything with an empty slot.

use crate::tx_builder::errors::TransactionBuilderError;
use crate::types::RecentAnchor;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Signature, Signer},
    transaction::VersionedTransaction,
};

/// A compiled, unsigned transaction
#[derive(Debug, Clone)]
pub struct TxBuildOutput {
    /// The transaction with one default signature per required signer
    pub tx: VersionedTransaction,

    /// Anchor the message was compiled against
    pub anchor: RecentAnchor,

    /// Required signers in signature-slot order
    pub required_signers: Vec<Pubkey>,
}

impl TxBuildOutput {
    pub fn new(tx: VersionedTransaction, anchor: RecentAnchor) -> Self {
        let required_signers = crate::compat::get_required_signers(&tx.message).to_vec();

        Self {
            tx,
            anchor,
            required_signers,
        }
    }

    pub fn tx_ref(&self) -> &VersionedTransaction {
        &self.tx
    }

    pub fn required_signers(&self) -> &[Pubkey] {
        &self.required_signers
    }

    /// Serialized wire size in bytes
    pub fn serialized_size(&self) -> Result<usize, TransactionBuilderError> {
        serialized_size(&self.tx)
    }

    /// Sign with any subset of the required signers, in any order
    ///
    /// # Errors
    ///
    /// `UnexpectedSigner` if a keypair is not a required signer of this
    /// message. Nothing is signed in that case.
    pub fn sign(self, signers: &[&dyn Signer]) -> Result<SignedTransaction, TransactionBuilderError> {
        let mut signed = SignedTransaction {
            tx: self.tx,
            anchor: self.anchor,
            required_signers: self.required_signers,
        };
        signed.sign(signers)?;
        Ok(signed)
    }
}

/// A transaction carrying some or all of its signatures
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    tx: VersionedTransaction,
    anchor: RecentAnchor,
    required_signers: Vec<Pubkey>,
}

impl SignedTransaction {
    /// Add signatures from more keypairs
    ///
    /// Re-signing a slot that is already filled overwrites it with an
    /// identical signature.
    pub fn sign(&mut self, signers: &[&dyn Signer]) -> Result<(), TransactionBuilderError> {
        // Resolve every slot first so an unexpected signer leaves the tx untouched
        let mut slots = Vec::with_capacity(signers.len());
        for signer in signers {
            let pubkey = signer
                .try_pubkey()
                .map_err(|e| TransactionBuilderError::Signing(e.to_string()))?;
            let slot = crate::compat::signer_slot(&self.tx.message, &pubkey)
                .ok_or(TransactionBuilderError::UnexpectedSigner(pubkey))?;
            slots.push((slot, *signer));
        }

        let message_bytes = self.tx.message.serialize();
        for (slot, signer) in slots {
            let signature = signer
                .try_sign_message(&message_bytes)
                .map_err(|e| TransactionBuilderError::Signing(e.to_string()))?;
            self.tx.signatures[slot] = signature;
        }
        Ok(())
    }

    /// Required signers whose slot is still empty
    pub fn missing_signers(&self) -> Vec<Pubkey> {
        self.required_signers
            .iter()
            .zip(&self.tx.signatures)
            .filter(|(_, sig)| **sig == Signature::default())
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn is_fully_signed(&self) -> bool {
        self.missing_signers().is_empty()
    }

    /// The transaction id: the fee payer's signature
    pub fn signature(&self) -> Signature {
        self.tx.signatures.first().copied().unwrap_or_default()
    }

    pub fn tx(&self) -> &VersionedTransaction {
        &self.tx
    }

    pub fn into_tx(self) -> VersionedTransaction {
        self.tx
    }

    pub fn anchor(&self) -> &RecentAnchor {
        &self.anchor
    }

    pub fn required_signers(&self) -> &[Pubkey] {
        &self.required_signers
    }

    pub fn serialized_size(&self) -> Result<usize, TransactionBuilderError> {
        serialized_size(&self.tx)
    }

    /// Wire bytes in base64, as `sendTransaction` and explorers' inspectors take them
    pub fn to_base64(&self) -> Result<String, TransactionBuilderError> {
        bincode::serialize(&self.tx)
            .map(|bytes| BASE64_STANDARD.encode(bytes))
            .map_err(|e| TransactionBuilderError::internal(format!("serialize failed: {}", e)))
    }

    /// Fail with `MissingSignature` unless every slot is filled
    pub fn ensure_fully_signed(&self) -> Result<(), TransactionBuilderError> {
        let missing = self.missing_signers();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(TransactionBuilderError::MissingSignature {
                signature: self.signature(),
                missing,
            })
        }
    }
}

fn serialized_size(tx: &VersionedTransaction) -> Result<usize, TransactionBuilderError> {
    bincode::serialized_size(tx)
        .map(|size| size as usize)
        .map_err(|e| TransactionBuilderError::internal(format!("failed to serialize transaction: {}", e)))
}
