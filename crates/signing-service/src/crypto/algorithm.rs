use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownAlgorithm;

/// Signature scheme a device is bound to for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Algorithm {
    /// RSA-PSS over SHA-256.
    #[serde(rename = "RSA")]
    Rsa,
    /// ECDSA on P-384 over SHA-256, DER encoded.
    #[serde(rename = "ECDSA")]
    Ecdsa,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::Rsa, Algorithm::Ecdsa];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Rsa => "RSA",
            Algorithm::Ecdsa => "ECDSA",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("RSA".parse::<Algorithm>().unwrap(), Algorithm::Rsa);
        assert_eq!("ecdsa".parse::<Algorithm>().unwrap(), Algorithm::Ecdsa);
        assert_eq!(" Ecdsa ".parse::<Algorithm>().unwrap(), Algorithm::Ecdsa);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "ED25519".parse::<Algorithm>().unwrap_err();
        assert_eq!(err, UnknownAlgorithm("ED25519".into()));
    }

    #[test]
    fn serializes_as_upper_case_tag() {
        assert_eq!(serde_json::to_string(&Algorithm::Rsa).unwrap(), "\"RSA\"");
        assert_eq!(serde_json::to_string(&Algorithm::Ecdsa).unwrap(), "\"ECDSA\"");
    }
}
