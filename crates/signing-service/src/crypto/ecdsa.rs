use p384::ecdsa::signature::hazmat::RandomizedPrehashSigner;
use p384::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use super::signer::{DeviceSigner, KeyGenerator};
use super::{Algorithm, KeyPair, PrivateKey, PublicKey};
use crate::error::CryptoError;

/// Generates P-384 key pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaKeyGenerator;

impl KeyGenerator for EcdsaKeyGenerator {
    fn generate(&self) -> Result<KeyPair, CryptoError> {
        let signing_key = SigningKey::random(&mut OsRng);
        Ok(KeyPair::from_private(PrivateKey::Ecdsa(signing_key)))
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Ecdsa
    }
}

/// ECDSA signer on the P-384 curve.
///
/// The message is hashed with SHA-256 rather than the curve's native
/// SHA-384, and the nonce is hedged with fresh randomness. Signatures are
/// ASN.1 DER encoded.
pub struct EcdsaP384Signer<'k> {
    signing_key: &'k SigningKey,
}

impl<'k> EcdsaP384Signer<'k> {
    pub fn new(signing_key: &'k SigningKey) -> Self {
        Self { signing_key }
    }
}

/// Signer factory registered for this algorithm.
pub fn ecdsa_p384_signer(key: &PrivateKey) -> Result<Box<dyn DeviceSigner + '_>, CryptoError> {
    Ok(Box::new(EcdsaP384Signer::try_from(key)?))
}

impl<'k> TryFrom<&'k PrivateKey> for EcdsaP384Signer<'k> {
    type Error = CryptoError;

    fn try_from(key: &'k PrivateKey) -> Result<Self, Self::Error> {
        match key {
            PrivateKey::Ecdsa(signing_key) => Ok(Self::new(signing_key)),
            other => Err(CryptoError::KeyTypeMismatch {
                expected: Algorithm::Ecdsa,
                actual: other.algorithm(),
            }),
        }
    }
}

impl DeviceSigner for EcdsaP384Signer<'_> {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let digest = Sha256::digest(message);
        let signature: Signature = self
            .signing_key
            .sign_prehash_with_rng(&mut OsRng, &digest)
            .map_err(|e| CryptoError::Signing {
                algorithm: Algorithm::Ecdsa,
                reason: e.to_string(),
            })?;
        Ok(signature.to_der().as_bytes().to_vec())
    }

    fn public_key(&self) -> PublicKey {
        PublicKey::Ecdsa(VerifyingKey::from(self.signing_key))
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Ecdsa
    }
}
