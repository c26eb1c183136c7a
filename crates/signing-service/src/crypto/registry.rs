use std::collections::HashMap;

use super::ecdsa::{EcdsaKeyGenerator, ecdsa_p384_signer};
use super::rsa::{RsaKeyGenerator, rsa_pss_signer};
use super::signer::{DeviceSigner, KeyGenerator};
use super::{Algorithm, KeyPair, PrivateKey, marshal};
use crate::error::CryptoError;

/// Builds a signer bound to a private key, failing if the key belongs to another algorithm.
pub type SignerFactory =
    for<'k> fn(&'k PrivateKey) -> Result<Box<dyn DeviceSigner + 'k>, CryptoError>;

struct AlgorithmEntry {
    generator: Box<dyn KeyGenerator>,
    signer_factory: SignerFactory,
}

/// Table of the algorithms this process supports.
///
/// Built once at startup and shared behind an `Arc`; it is never mutated
/// afterwards, so lookups need no synchronization. Supporting a new
/// algorithm only means registering another generator/signer pair here.
#[derive(Default)]
pub struct AlgorithmRegistry {
    entries: HashMap<Algorithm, AlgorithmEntry>,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with RSA and ECDSA enabled.
    pub fn with_defaults(rsa_generator: RsaKeyGenerator) -> Self {
        Self::new()
            .register(rsa_generator, rsa_pss_signer)
            .register(EcdsaKeyGenerator, ecdsa_p384_signer)
    }

    /// Register `generator` and the signer factory for its algorithm,
    /// replacing any earlier registration of the same algorithm.
    pub fn register<G>(mut self, generator: G, signer_factory: SignerFactory) -> Self
    where
        G: KeyGenerator + 'static,
    {
        self.entries.insert(
            generator.algorithm(),
            AlgorithmEntry {
                generator: Box::new(generator),
                signer_factory,
            },
        );
        self
    }

    pub fn supports(&self, algorithm: Algorithm) -> bool {
        self.entries.contains_key(&algorithm)
    }

    /// Enabled algorithms in a stable order.
    pub fn algorithms(&self) -> Vec<Algorithm> {
        let mut algorithms: Vec<_> = self.entries.keys().copied().collect();
        algorithms.sort();
        algorithms
    }

    pub fn generate(&self, algorithm: Algorithm) -> Result<KeyPair, CryptoError> {
        self.entry(algorithm)?.generator.generate()
    }

    pub fn signer<'k>(
        &self,
        algorithm: Algorithm,
        private_key: &'k PrivateKey,
    ) -> Result<Box<dyn DeviceSigner + 'k>, CryptoError> {
        (self.entry(algorithm)?.signer_factory)(private_key)
    }

    /// Classify raw PEM key material as a private key of `algorithm`.
    ///
    /// Entry point for keys that arrive as bytes rather than from
    /// [`AlgorithmRegistry::generate`], e.g. when restoring devices from
    /// an external key store.
    pub fn load_private_key(
        &self,
        algorithm: Algorithm,
        pem: &str,
    ) -> Result<PrivateKey, CryptoError> {
        self.entry(algorithm)?;
        marshal::decode_private_key(algorithm, pem)
    }

    fn entry(&self, algorithm: Algorithm) -> Result<&AlgorithmEntry, CryptoError> {
        self.entries
            .get(&algorithm)
            .ok_or(CryptoError::UnsupportedAlgorithm(algorithm))
    }
}
