use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::crypto::Algorithm;

/// Failures raised by key generation, key classification and signing.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("signature algorithm {0} is not enabled")]
    UnsupportedAlgorithm(Algorithm),
    #[error("failed to generate {algorithm} key pair: {reason}")]
    KeyGeneration { algorithm: Algorithm, reason: String },
    #[error("key type mismatch: expected {expected} key, got {actual} key")]
    KeyTypeMismatch { expected: Algorithm, actual: Algorithm },
    #[error("signer is not bound to the key of device {0}")]
    ForeignKey(String),
    #[error("failed to sign with {algorithm}: {reason}")]
    Signing { algorithm: Algorithm, reason: String },
    #[error("failed to encode or decode key material: {0}")]
    KeyEncoding(String),
    #[error("RSA key size of {bits} bits is below the secure minimum of {minimum} bits")]
    InsecureKeySize { bits: usize, minimum: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("device {0} not found")]
    NotFound(String),
    #[error("device {0} already exists")]
    AlreadyExists(String),
}

/// Algorithm tag that does not name any known signature scheme.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported signature algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

/// Errors reported by the device operations of [`crate::SigningService`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("device {0} not found")]
    NotFound(String),
    #[error("device {0} already exists")]
    AlreadyExists(String),
    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("key generation failed: {0}")]
    KeyGenerationFailure(String),
    #[error("{0}")]
    KeyTypeMismatch(String),
    #[error("signing failed: {0}")]
    SigningFailure(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::AlreadyExists(id) => Self::AlreadyExists(id),
        }
    }
}

impl From<UnknownAlgorithm> for ServiceError {
    fn from(error: UnknownAlgorithm) -> Self {
        Self::UnsupportedAlgorithm(error.0)
    }
}

impl From<CryptoError> for ServiceError {
    fn from(error: CryptoError) -> Self {
        match error {
            CryptoError::UnsupportedAlgorithm(algorithm) => {
                Self::UnsupportedAlgorithm(algorithm.to_string())
            }
            error @ CryptoError::KeyGeneration { .. } => {
                Self::KeyGenerationFailure(error.to_string())
            }
            error @ (CryptoError::KeyTypeMismatch { .. }
            | CryptoError::ForeignKey(_)
            | CryptoError::KeyEncoding(_)) => {
                Self::KeyTypeMismatch(error.to_string())
            }
            error @ CryptoError::Signing { .. } => Self::SigningFailure(error.to_string()),
            error @ CryptoError::InsecureKeySize { .. } => Self::Config(error.to_string()),
        }
    }
}

/// Error returned by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("invalid request body: {0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    errors: Vec<String>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Service(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Service(ServiceError::AlreadyExists(_)) => StatusCode::CONFLICT,
            ApiError::Service(ServiceError::UnsupportedAlgorithm(_)) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Trait implementation to convert this error into an axum http response
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "Something wrong happened.".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorBody { errors: vec![message] })).into_response()
    }
}
