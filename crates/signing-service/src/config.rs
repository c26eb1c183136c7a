use crate::crypto::{
    Algorithm, AlgorithmRegistry, EcdsaKeyGenerator, MIN_SECURE_RSA_KEY_BITS, RsaKeyGenerator,
    ecdsa_p384_signer, rsa_pss_signer,
};
use crate::error::ServiceError;

/// Settings that shape the algorithm registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Algorithms devices may be created with.
    pub algorithms: Vec<Algorithm>,
    pub rsa_key_bits: usize,
    /// Permit RSA moduli below 2048 bits. Test setups only.
    pub allow_insecure_rsa_keys: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            algorithms: Algorithm::ALL.to_vec(),
            rsa_key_bits: MIN_SECURE_RSA_KEY_BITS,
            allow_insecure_rsa_keys: false,
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.algorithms.is_empty() {
            return Err(ServiceError::Config(
                "at least one signature algorithm must be enabled".to_string(),
            ));
        }
        if self.algorithms.contains(&Algorithm::Rsa) && !self.allow_insecure_rsa_keys {
            RsaKeyGenerator::new(self.rsa_key_bits)?;
        }
        Ok(())
    }

    /// Build the process-wide registry holding exactly the configured algorithms.
    pub fn build_registry(&self) -> Result<AlgorithmRegistry, ServiceError> {
        self.validate()?;
        let mut registry = AlgorithmRegistry::new();
        for algorithm in &self.algorithms {
            registry = match algorithm {
                Algorithm::Rsa => registry.register(self.rsa_generator()?, rsa_pss_signer),
                Algorithm::Ecdsa => registry.register(EcdsaKeyGenerator, ecdsa_p384_signer),
            };
        }
        Ok(registry)
    }

    fn rsa_generator(&self) -> Result<RsaKeyGenerator, ServiceError> {
        if self.allow_insecure_rsa_keys {
            Ok(RsaKeyGenerator::insecure(self.rsa_key_bits))
        } else {
            Ok(RsaKeyGenerator::new(self.rsa_key_bits)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enables_all_algorithms() {
        let registry = ServiceConfig::default().build_registry().unwrap();
        assert_eq!(registry.algorithms(), Algorithm::ALL.to_vec());
    }

    #[test]
    fn small_rsa_keys_need_explicit_opt_in() {
        let mut config = ServiceConfig {
            rsa_key_bits: 1024,
            ..ServiceConfig::default()
        };
        assert!(matches!(config.validate(), Err(ServiceError::Config(_))));

        config.allow_insecure_rsa_keys = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn small_rsa_keys_are_irrelevant_without_rsa() {
        let config = ServiceConfig {
            algorithms: vec![Algorithm::Ecdsa],
            rsa_key_bits: 512,
            allow_insecure_rsa_keys: false,
        };
        let registry = config.build_registry().unwrap();
        assert_eq!(registry.algorithms(), vec![Algorithm::Ecdsa]);
    }

    #[test]
    fn empty_algorithm_list_is_rejected() {
        let config = ServiceConfig {
            algorithms: Vec::new(),
            ..ServiceConfig::default()
        };
        assert!(matches!(config.build_registry(), Err(ServiceError::Config(_))));
    }
}
