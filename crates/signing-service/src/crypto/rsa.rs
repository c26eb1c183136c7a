use rand::rngs::OsRng;
use rsa::{Pss, RsaPrivateKey};
use sha2::{Digest, Sha256};

use super::signer::{DeviceSigner, KeyGenerator};
use super::{Algorithm, KeyPair, PrivateKey, PublicKey};
use crate::error::CryptoError;

/// Smallest modulus accepted outside of explicitly insecure setups.
pub const MIN_SECURE_RSA_KEY_BITS: usize = 2048;

/// Generates RSA key pairs of a fixed modulus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsaKeyGenerator {
    bits: usize,
}

impl RsaKeyGenerator {
    /// Rejects sizes below [`MIN_SECURE_RSA_KEY_BITS`].
    pub fn new(bits: usize) -> Result<Self, CryptoError> {
        if bits < MIN_SECURE_RSA_KEY_BITS {
            return Err(CryptoError::InsecureKeySize {
                bits,
                minimum: MIN_SECURE_RSA_KEY_BITS,
            });
        }
        Ok(Self { bits })
    }

    /// Accepts any size. Only meant for tests where 2048-bit generation is too slow.
    pub fn insecure(bits: usize) -> Self {
        if bits < MIN_SECURE_RSA_KEY_BITS {
            tracing::warn!(bits, "using insecure RSA key size");
        }
        Self { bits }
    }

    pub fn bits(&self) -> usize {
        self.bits
    }
}

impl Default for RsaKeyGenerator {
    fn default() -> Self {
        Self {
            bits: MIN_SECURE_RSA_KEY_BITS,
        }
    }
}

impl KeyGenerator for RsaKeyGenerator {
    fn generate(&self) -> Result<KeyPair, CryptoError> {
        let private_key =
            RsaPrivateKey::new(&mut OsRng, self.bits).map_err(|e| CryptoError::KeyGeneration {
                algorithm: Algorithm::Rsa,
                reason: e.to_string(),
            })?;
        Ok(KeyPair::from_private(PrivateKey::Rsa(private_key)))
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Rsa
    }
}

/// RSA-PSS signer with SHA-256 digest and digest-length salt.
pub struct RsaPssSigner<'k> {
    private_key: &'k RsaPrivateKey,
}

impl<'k> RsaPssSigner<'k> {
    pub fn new(private_key: &'k RsaPrivateKey) -> Self {
        Self { private_key }
    }
}

/// Signer factory registered for this algorithm.
pub fn rsa_pss_signer(key: &PrivateKey) -> Result<Box<dyn DeviceSigner + '_>, CryptoError> {
    Ok(Box::new(RsaPssSigner::try_from(key)?))
}

impl<'k> TryFrom<&'k PrivateKey> for RsaPssSigner<'k> {
    type Error = CryptoError;

    fn try_from(key: &'k PrivateKey) -> Result<Self, Self::Error> {
        match key {
            PrivateKey::Rsa(private_key) => Ok(Self::new(private_key)),
            other => Err(CryptoError::KeyTypeMismatch {
                expected: Algorithm::Rsa,
                actual: other.algorithm(),
            }),
        }
    }
}

impl DeviceSigner for RsaPssSigner<'_> {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let digest = Sha256::digest(message);
        self.private_key
            .sign_with_rng(&mut OsRng, Pss::new::<Sha256>(), &digest)
            .map_err(|e| CryptoError::Signing {
                algorithm: Algorithm::Rsa,
                reason: e.to_string(),
            })
    }

    fn public_key(&self) -> PublicKey {
        PublicKey::Rsa(self.private_key.to_public_key())
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Rsa
    }
}
