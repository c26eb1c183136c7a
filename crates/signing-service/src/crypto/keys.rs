use std::fmt;

use p384::ecdsa::signature::hazmat::PrehashVerifier;
use p384::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use rsa::{Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use super::Algorithm;

/// Private key material, one variant per supported algorithm.
#[derive(Clone)]
pub enum PrivateKey {
    Rsa(RsaPrivateKey),
    Ecdsa(SigningKey),
}

/// Public key material, one variant per supported algorithm.
#[derive(Clone, PartialEq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    Ecdsa(VerifyingKey),
}

/// A freshly generated or decoded key pair.
#[derive(Clone)]
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

impl PrivateKey {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            PrivateKey::Rsa(_) => Algorithm::Rsa,
            PrivateKey::Ecdsa(_) => Algorithm::Ecdsa,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Rsa(key) => PublicKey::Rsa(key.to_public_key()),
            PrivateKey::Ecdsa(key) => PublicKey::Ecdsa(VerifyingKey::from(key)),
        }
    }
}

// Key material never ends up in logs.
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey::{}(..)", self.algorithm())
    }
}

impl PublicKey {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            PublicKey::Rsa(_) => Algorithm::Rsa,
            PublicKey::Ecdsa(_) => Algorithm::Ecdsa,
        }
    }

    /// Check a raw signature produced by the matching signer over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let digest = Sha256::digest(message);
        match self {
            PublicKey::Rsa(key) => key.verify(Pss::new::<Sha256>(), &digest, signature).is_ok(),
            PublicKey::Ecdsa(key) => EcdsaSignature::from_der(signature)
                .and_then(|signature| key.verify_prehash(&digest, &signature))
                .is_ok(),
        }
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey::{}(..)", self.algorithm())
    }
}

impl KeyPair {
    pub fn from_private(private: PrivateKey) -> Self {
        Self {
            public: private.public_key(),
            private,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.private.algorithm()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}
