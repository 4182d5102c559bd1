//! Request-time session gate
//!
//! The per-request allow/deny decision. All state needed for the decision
//! travels inside the token itself; nothing persists across requests here,
//! so concurrent requests validate independently with no shared mutable
//! state. What a deny looked like internally (missing token, bad token,
//! fingerprint mismatch) stays in the logs: every deny produces the same
//! fixed payload on the wire.

use serde::{Deserialize, Serialize};

use crate::config::GateConfig;
use crate::error::GateError;
use crate::token::{TokenCodec, ValidatedSession};

/// Request header carrying the session token; the refreshed token goes back
/// to the client in the same header. Lowercase for HTTP/2 compatibility;
/// header names are matched case-insensitively on the wire.
pub const TOKEN_HEADER: &str = "user-token";

/// Request header the client fingerprint is read from.
pub const FINGERPRINT_HEADER: &str = "user-agent";

/// Key under which the recovered identity is bound into the session store.
pub const SESSION_IDENTITY_KEY: &str = "session_customer_id";

/// Why a request was denied. Logged, never surfaced to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No token header, or a blank one
    MissingToken,
    /// Token failed signature, structure or validity-window checks
    InvalidToken,
    /// Token is valid but was issued to a different client
    FingerprintMismatch,
}

/// Outcome of [`SessionGate::authorize`].
#[derive(Debug, Clone)]
pub enum Decision {
    /// Request may proceed; the caller must attach the refreshed token to
    /// the response and bind the identity for downstream handlers.
    Allow(ValidatedSession),
    /// Request must be short-circuited with the fixed denial payload.
    Deny(DenyReason),
}

impl Decision {
    /// True if the request was allowed
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// Fixed-shape denial payload.
///
/// One payload for every failure mode: empty placeholders, machine code
/// `4007`. Clients key off the code, never off HTTP status alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenialBody {
    pub hmac: String,
    pub status: String,
    pub code: String,
    pub msg: String,
    pub data: String,
}

impl DenialBody {
    /// Denial code for an unauthenticated request
    pub const NOT_LOGGED_IN_CODE: &'static str = "4007";

    /// The one denial payload every failed request receives
    pub fn not_logged_in() -> Self {
        Self {
            hmac: String::new(),
            status: String::new(),
            code: Self::NOT_LOGGED_IN_CODE.to_string(),
            msg: "not logged in".to_string(),
            data: String::new(),
        }
    }
}

/// Stateless per-request authorization gate.
#[derive(Debug, Clone)]
pub struct SessionGate {
    codec: TokenCodec,
}

impl SessionGate {
    /// Create a gate from configuration.
    pub fn new(config: &GateConfig) -> Result<Self, GateError> {
        Ok(Self {
            codec: TokenCodec::new(config)?,
        })
    }

    /// Access the underlying codec, e.g. to issue the initial login token.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Decide whether a request may proceed.
    ///
    /// `token` is the value of the [`TOKEN_HEADER`] if present, `fingerprint`
    /// the live value of the [`FINGERPRINT_HEADER`]. The embedded fingerprint
    /// must equal the live one exactly: a cryptographically valid token
    /// presented by a different client is still denied (replay defence).
    pub fn authorize(&self, token: Option<&str>, fingerprint: Option<&str>) -> Decision {
        let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
            tracing::debug!("request carries no session token");
            return Decision::Deny(DenyReason::MissingToken);
        };

        let session = match self.codec.validate_and_refresh(token) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "session token rejected");
                return Decision::Deny(DenyReason::InvalidToken);
            }
        };

        let live = fingerprint.unwrap_or("");
        if live != session.fingerprint {
            tracing::warn!(
                fingerprint = %live,
                "client fingerprint does not match the one bound at issuance"
            );
            return Decision::Deny(DenyReason::FingerprintMismatch);
        }

        Decision::Allow(session)
    }
}
