use super::{Algorithm, KeyPair, PublicKey};
use crate::error::CryptoError;

/// Signs the secured string of a device chain with a key bound at construction.
///
/// Implementations are sync, signing is CPU-bound.
/// Async callers should run them on `spawn_blocking`.
pub trait DeviceSigner: Send + Sync {
    /// Sign the message bytes. Returns raw signature bytes.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Public half of the key this signer is bound to.
    fn public_key(&self) -> PublicKey;

    fn algorithm(&self) -> Algorithm;
}

/// Produces fresh key pairs for one algorithm.
pub trait KeyGenerator: Send + Sync {
    fn generate(&self) -> Result<KeyPair, CryptoError>;

    fn algorithm(&self) -> Algorithm;
}
