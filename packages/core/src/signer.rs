//! Gateway trust configuration and attestation signing.
//!
//! Every bridge instance is configured with a [`SignerSet`]: the addresses
//! whose attestations it accepts, and how many distinct members must sign.
//! Deployments today run a single trusted gateway key with threshold 1, but
//! the state machine never special-cases that; swapping in a larger set is
//! purely a configuration change.

use alloy::primitives::{Address, B256, PrimitiveSignature as Signature};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use eyre::{Result, WrapErr};
use std::collections::HashSet;
use thiserror::Error;

/// Errors constructing a signer set.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignerSetError {
    #[error("Signer set must not be empty")]
    Empty,

    #[error("Threshold {threshold} exceeds signer count {signers}")]
    ThresholdTooHigh { threshold: usize, signers: usize },

    #[error("Threshold must be at least 1")]
    ZeroThreshold,
}

/// Errors verifying an attestation against a signer set.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerifyError {
    /// A signature failed to recover, or recovered to an address outside
    /// the configured set.
    #[error("ECDSA: invalid signature")]
    InvalidSignature,

    /// All signatures were valid members, but fewer distinct members signed
    /// than the threshold requires.
    #[error("Insufficient signatures: got {got}, need {required}")]
    InsufficientSignatures { got: usize, required: usize },
}

/// The set of signer addresses a bridge instance trusts, with the number of
/// distinct members that must sign a message hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerSet {
    signers: HashSet<Address>,
    threshold: usize,
}

impl SignerSet {
    pub fn new(signers: Vec<Address>, threshold: usize) -> Result<Self, SignerSetError> {
        if signers.is_empty() {
            return Err(SignerSetError::Empty);
        }
        if threshold == 0 {
            return Err(SignerSetError::ZeroThreshold);
        }
        let signers: HashSet<Address> = signers.into_iter().collect();
        if threshold > signers.len() {
            return Err(SignerSetError::ThresholdTooHigh {
                threshold,
                signers: signers.len(),
            });
        }
        Ok(Self { signers, threshold })
    }

    /// The common deployment shape: one trusted gateway, threshold 1.
    pub fn single(signer: Address) -> Self {
        Self {
            signers: HashSet::from([signer]),
            threshold: 1,
        }
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.signers.contains(address)
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Verify that `signatures` carries at least `threshold` distinct
    /// configured signers over `message_hash`.
    ///
    /// Any signature that fails to recover, or recovers to an address
    /// outside the set, rejects the whole attestation. Duplicate signers
    /// count once.
    pub fn verify(&self, message_hash: &B256, signatures: &[Signature]) -> Result<(), VerifyError> {
        let mut seen: HashSet<Address> = HashSet::new();

        for signature in signatures {
            let recovered = signature
                .recover_address_from_prehash(message_hash)
                .map_err(|_| VerifyError::InvalidSignature)?;
            if !self.signers.contains(&recovered) {
                return Err(VerifyError::InvalidSignature);
            }
            seen.insert(recovered);
        }

        if seen.len() < self.threshold {
            return Err(VerifyError::InsufficientSignatures {
                got: seen.len(),
                required: self.threshold,
            });
        }

        Ok(())
    }
}

/// The relayer's signing identity. Its address must be configured as a
/// trusted signer (and as the gateway caller) on every participating bridge
/// instance.
#[derive(Clone)]
pub struct GatewaySigner {
    inner: PrivateKeySigner,
}

impl GatewaySigner {
    /// Parse a hex-encoded secp256k1 private key (with or without 0x prefix).
    pub fn from_hex(key: &str) -> Result<Self> {
        let inner: PrivateKeySigner = key
            .trim_start_matches("0x")
            .parse()
            .wrap_err("Failed to parse gateway private key")?;
        Ok(Self { inner })
    }

    /// Generate a fresh key. Used by the local devnet and tests.
    pub fn random() -> Self {
        Self {
            inner: PrivateKeySigner::random(),
        }
    }

    pub fn address(&self) -> Address {
        self.inner.address()
    }

    /// Sign a message hash directly (no message prefix); the bridge verifies
    /// by recovering over the same prehash.
    pub fn sign_message_hash(&self, message_hash: &B256) -> Result<Signature> {
        self.inner
            .sign_hash_sync(message_hash)
            .wrap_err("Failed to sign message hash")
    }
}

/// Never log key material.
impl std::fmt::Debug for GatewaySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySigner")
            .field("address", &self.inner.address())
            .finish()
    }
}
