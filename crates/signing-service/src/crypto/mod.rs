mod algorithm;
mod ecdsa;
mod keys;
mod marshal;
mod registry;
mod rsa;
mod signer;

pub use algorithm::Algorithm;
pub use ecdsa::{EcdsaKeyGenerator, EcdsaP384Signer, ecdsa_p384_signer};
pub use keys::{KeyPair, PrivateKey, PublicKey};
pub use marshal::{classify_private_key, decode_private_key, encode_key_pair};
pub use registry::{AlgorithmRegistry, SignerFactory};
pub use self::rsa::{MIN_SECURE_RSA_KEY_BITS, RsaKeyGenerator, RsaPssSigner, rsa_pss_signer};
pub use signer::{DeviceSigner, KeyGenerator};
