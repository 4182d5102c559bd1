//! Signed session token codec
//!
//! Standard compact format: `base64url(header).base64url(claims).base64url(sig)`,
//! signed with HMAC-SHA256. The algorithm is pinned; there is no negotiation
//! and no other algorithm is ever accepted (downgrade protection). The user
//! identity never appears in the claims in the clear: it is AES-encrypted and
//! hex-encoded before embedding.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use crate::cipher::IdentityCipher;
use crate::config::GateConfig;
use crate::error::GateError;

/// Claims carried by a session token.
///
/// `user_id` is the encrypted identity (uppercase hex), `user_agent` the
/// client fingerprint embedded verbatim at issuance. `exp`/`nbf` are only
/// present when a token lifetime is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Encrypted identity, uppercase hex
    pub user_id: String,
    /// Display name
    pub user_name: String,
    /// Client fingerprint (verbatim, not encrypted)
    pub user_agent: String,
    /// Issued-at timestamp (seconds)
    pub iat: i64,
    /// Not-before timestamp; absent when the token never expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Expiry timestamp; absent when the token never expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Caller-supplied custom fields, carried through refresh verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Outcome of a successful validate-and-refresh.
///
/// Transient: produced per request and never persisted. `refreshed_token`
/// is a brand-new token with a fresh validity window; the old token is not
/// extended in place.
#[derive(Debug, Clone)]
pub struct ValidatedSession {
    /// Recovered plaintext identity
    pub identity: String,
    /// Display name from the token
    pub display_name: String,
    /// Fingerprint embedded at issuance
    pub fingerprint: String,
    /// Fresh token to hand back to the client
    pub refreshed_token: String,
}

/// Builds and parses signed session tokens.
///
/// Stateless apart from the immutable key material; safe to share across
/// concurrent requests.
#[derive(Clone)]
pub struct TokenCodec {
    cipher: IdentityCipher,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
    ttl: Option<Duration>,
}

impl TokenCodec {
    /// Create a codec from gate configuration.
    ///
    /// # Errors
    /// Returns [`GateError::Configuration`] if the signing secret is not
    /// valid base64.
    pub fn new(config: &GateConfig) -> Result<Self, GateError> {
        let encoding_key = EncodingKey::from_base64_secret(&config.signing_secret_b64)
            .map_err(|e| GateError::Configuration(format!("signing secret: {e}")))?;
        let decoding_key = DecodingKey::from_base64_secret(&config.signing_secret_b64)
            .map_err(|e| GateError::Configuration(format!("signing secret: {e}")))?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens issued without a TTL carry no exp at all; validate exp/nbf
        // when present but do not require them.
        validation.required_spec_claims = HashSet::new();
        validation.validate_nbf = true;
        // A token is invalid the moment exp passes.
        validation.leeway = 0;

        Ok(Self {
            cipher: IdentityCipher::new(&config.passphrase),
            encoding_key,
            decoding_key,
            header: Header::new(Algorithm::HS256),
            validation,
            ttl: config.token_ttl,
        })
    }

    /// Issue a fresh token for the given identity.
    ///
    /// The identity is encrypted before embedding; the fingerprint and any
    /// extra fields are embedded verbatim. When a TTL is configured the
    /// validity window is `[now, now + ttl]`, otherwise the token never
    /// expires.
    pub fn issue(
        &self,
        identity: &str,
        display_name: &str,
        fingerprint: &str,
        extra: &BTreeMap<String, serde_json::Value>,
    ) -> Result<String, GateError> {
        let user_id = self.cipher.encrypt_to_hex(identity).ok_or(GateError::Crypto)?;

        let now = Utc::now().timestamp();
        let (nbf, exp) = match self.ttl {
            Some(ttl) => (Some(now), Some(now + ttl.as_secs() as i64)),
            None => (None, None),
        };

        let claims = SessionClaims {
            user_id,
            user_name: display_name.to_string(),
            user_agent: fingerprint.to_string(),
            iat: now,
            nbf,
            exp,
            extra: extra.clone(),
        };

        encode(&self.header, &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "failed to sign token");
            GateError::Crypto
        })
    }

    /// Parse and verify a token, returning its claims.
    ///
    /// # Errors
    /// [`GateError::MissingToken`] on blank input; [`GateError::InvalidToken`]
    /// for everything else (malformed, bad signature, expired, not yet
    /// valid) with no further distinction.
    pub fn parse(&self, token: &str) -> Result<SessionClaims, GateError> {
        if token.trim().is_empty() {
            tracing::warn!("token is blank");
            return Err(GateError::MissingToken);
        }

        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                // The reason stays in the logs; callers see one outcome.
                tracing::debug!(error = %e, "token rejected");
                GateError::InvalidToken
            })?;

        Ok(data.claims)
    }

    /// Validate a token and issue its replacement (sliding expiration).
    ///
    /// Decrypts the embedded identity and re-issues a brand-new token with a
    /// fresh validity window carrying the same display name, fingerprint and
    /// extra fields. A token whose embedded identity does not decrypt is
    /// treated as invalid: no refreshed token is ever issued around an
    /// unrecoverable identity.
    pub fn validate_and_refresh(&self, token: &str) -> Result<ValidatedSession, GateError> {
        let claims = self.parse(token)?;

        let identity = self.cipher.decrypt_from_hex(&claims.user_id).ok_or_else(|| {
            tracing::warn!("embedded identity failed to decrypt");
            GateError::InvalidToken
        })?;

        let refreshed_token =
            self.issue(&identity, &claims.user_name, &claims.user_agent, &claims.extra)?;

        Ok(ValidatedSession {
            identity,
            display_name: claims.user_name,
            fingerprint: claims.user_agent,
            refreshed_token,
        })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
