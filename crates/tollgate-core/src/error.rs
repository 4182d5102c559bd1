//! Gate errors

use thiserror::Error;

/// Token lifecycle errors.
///
/// Malformed tokens, bad signatures, expired tokens and not-yet-valid
/// tokens all surface as [`GateError::InvalidToken`]: callers must not be
/// able to distinguish why a token failed. The underlying reason is logged
/// at debug level where the failure is detected.
#[derive(Error, Debug)]
pub enum GateError {
    /// No token was presented, or the token header was blank
    #[error("missing token")]
    MissingToken,

    /// Invalid or expired token (malformed, bad signature, outside its
    /// validity window, or embedded identity unrecoverable)
    #[error("invalid or expired token")]
    InvalidToken,

    /// Token is valid but bound to a different client fingerprint
    #[error("fingerprint mismatch")]
    FingerprintMismatch,

    /// Encryption or decryption was unavailable
    #[error("crypto failure")]
    Crypto,

    /// Configuration error (e.g. signing secret is not valid base64)
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl GateError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingToken | Self::InvalidToken | Self::FingerprintMismatch => 401,
            Self::Crypto | Self::Configuration(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::FingerprintMismatch => "FINGERPRINT_MISMATCH",
            Self::Crypto => "CRYPTO_FAILURE",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}
