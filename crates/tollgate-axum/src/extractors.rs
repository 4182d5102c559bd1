//! Axum extractors for the validated session.
//!
//! [`GateLayer`] inserts a [`SessionContext`] into request extensions on
//! every allowed request; these extractors give handlers convenient access
//! to it.
//!
//! [`GateLayer`]: crate::layer::GateLayer

use std::ops::Deref;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::SessionRejection;

/// Validated session information for the current request.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Recovered plaintext identity
    pub identity: String,
    /// Display name from the token
    pub display_name: String,
    /// Client fingerprint bound at issuance
    pub fingerprint: String,
}

/// Extension key for storing the session context in request extensions.
#[derive(Debug, Clone)]
pub struct SessionContextExt(pub SessionContext);

/// Extractor that requires a validated session.
///
/// Rejects with the fixed denial payload if the route was reached without
/// passing through the gate.
#[derive(Debug, Clone)]
pub struct RequireSession(pub SessionContext);

impl Deref for RequireSession {
    type Target = SessionContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContextExt>()
            .cloned()
            .map(|ext| Self(ext.0))
            .ok_or(SessionRejection)
    }
}

/// Extractor for an optional session.
///
/// Returns `None` on ungated routes rather than failing.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<SessionContext>);

impl Deref for MaybeSession {
    type Target = Option<SessionContext>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<SessionContextExt>()
            .cloned()
            .map(|ext| ext.0);
        Ok(Self(session))
    }
}
