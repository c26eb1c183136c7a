//! Signing devices and the signature chaining protocol.
//!
//! Each signature covers a secured string of the form
//! `{counter}_{data}_{previous}` where `previous` is the base64 signature
//! committed just before, or the base64 device id for the first signature.
//! Every signature therefore depends on all earlier signatures of the device.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;

use crate::crypto::{Algorithm, DeviceSigner, KeyPair, PrivateKey, PublicKey};
use crate::error::CryptoError;

/// Public projection of a device. Never carries key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceView {
    pub id: String,
    pub algorithm: Algorithm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub signature_counter: u64,
}

/// Outcome of one committed signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureRecord {
    /// Base64 signature over `signed_data`.
    pub signature: String,
    /// The secured string that was signed.
    pub signed_data: String,
}

#[derive(Debug, Default)]
pub(crate) struct ChainState {
    counter: u64,
    last_signature: String,
}

pub struct Device {
    id: String,
    algorithm: Algorithm,
    label: Option<String>,
    public_key: PublicKey,
    private_key: PrivateKey,
    // Held for the whole read-sign-commit sequence of a signature.
    chain: Mutex<ChainState>,
    // Mirror of the committed counter for readers that must not wait on `chain`.
    committed: AtomicU64,
}

impl Device {
    /// New device with an empty chain. The algorithm follows the key pair.
    pub fn new(id: impl Into<String>, label: Option<String>, key_pair: KeyPair) -> Self {
        Self {
            id: id.into(),
            algorithm: key_pair.algorithm(),
            label,
            public_key: key_pair.public,
            private_key: key_pair.private,
            chain: Mutex::new(ChainState::default()),
            committed: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Key to bind a signer to. Never exposed outside the crate.
    pub(crate) fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// Number of committed signatures. Does not wait for an in-flight signature.
    pub fn signature_counter(&self) -> u64 {
        self.committed.load(Ordering::Acquire)
    }

    /// Base64 signature committed last, empty before the first signature.
    ///
    /// Waits for an in-flight signature of this device to finish.
    pub fn last_signature(&self) -> String {
        self.lock_chain().last_signature.clone()
    }

    pub fn view(&self) -> DeviceView {
        DeviceView {
            id: self.id.clone(),
            algorithm: self.algorithm,
            label: self.label.clone(),
            signature_counter: self.signature_counter(),
        }
    }

    /// Sign `data` as the next link of the chain and commit it.
    ///
    /// The chain lock is held from reading the counter until the new
    /// signature is committed, so concurrent callers each get a distinct
    /// counter value and a distinct predecessor. On error nothing is
    /// committed and a retry reuses the same counter.
    ///
    /// `signer` must be bound to this device's own key, as returned by
    /// [`crate::AlgorithmRegistry::signer`] for the device. Any other
    /// signer is rejected before the chain is touched.
    pub fn sign(
        &self,
        signer: &dyn DeviceSigner,
        data: &str,
    ) -> Result<SignatureRecord, CryptoError> {
        if signer.algorithm() != self.algorithm {
            return Err(CryptoError::KeyTypeMismatch {
                expected: self.algorithm,
                actual: signer.algorithm(),
            });
        }
        if signer.public_key() != self.public_key {
            return Err(CryptoError::ForeignKey(self.id.clone()));
        }

        let mut chain = self.lock_chain();
        let signed_data = self.secured_string(&chain, data);
        let signature = match signer.sign(signed_data.as_bytes()) {
            Ok(signature) => BASE64.encode(signature),
            Err(err) => {
                tracing::error!(device = %self.id, counter = chain.counter, error = %err, "signing failed");
                return Err(err);
            }
        };

        chain.counter += 1;
        chain.last_signature.clone_from(&signature);
        self.committed.store(chain.counter, Ordering::Release);
        tracing::debug!(device = %self.id, counter = chain.counter, "signature committed");

        Ok(SignatureRecord {
            signature,
            signed_data,
        })
    }

    /// Check a base64 signature over `signed_data` against this device's public key.
    pub fn verify(&self, signed_data: &str, signature: &str) -> bool {
        match BASE64.decode(signature) {
            Ok(raw) => self.public_key.verify(signed_data.as_bytes(), &raw),
            Err(_) => false,
        }
    }

    fn secured_string(&self, chain: &ChainState, data: &str) -> String {
        let previous = if chain.last_signature.is_empty() {
            BASE64.encode(self.id.as_bytes())
        } else {
            chain.last_signature.clone()
        };
        format!("{}_{}_{}", chain.counter, data, previous)
    }

    // A panic inside a signer happens before commit, so the state behind a
    // poisoned lock is still consistent.
    pub(crate) fn lock_chain(&self) -> MutexGuard<'_, ChainState> {
        self.chain.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("algorithm", &self.algorithm)
            .field("label", &self.label)
            .field("signature_counter", &self.signature_counter())
            .finish_non_exhaustive()
    }
}
