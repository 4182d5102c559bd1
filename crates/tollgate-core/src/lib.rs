//! Tollgate Core - Fingerprint-bound session tokens
//!
//! Core token lifecycle: AES-encrypted identity embedded in an HS256-signed
//! compact token, validated per request against the client fingerprint and
//! refreshed on every successful validation (sliding expiration).

pub mod cipher;
pub mod config;
pub mod error;
pub mod gate;
pub mod token;

pub use cipher::{from_hex, to_hex, IdentityCipher};
pub use config::{ConfigError, GateConfig};
pub use error::GateError;
pub use gate::{Decision, DenialBody, DenyReason, SessionGate};
pub use gate::{FINGERPRINT_HEADER, SESSION_IDENTITY_KEY, TOKEN_HEADER};
pub use token::{SessionClaims, TokenCodec, ValidatedSession};
