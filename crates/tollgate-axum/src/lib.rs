//! Tollgate Axum Integration
//!
//! Axum middleware and extractors for fingerprint-bound session tokens.
//!
//! # Overview
//!
//! [`GateLayer`] intercepts every request: it reads the `user-token` header,
//! runs the session gate, and either short-circuits with the fixed denial
//! payload or forwards the request with the recovered identity attached and
//! the refreshed token stamped onto the response.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use axum::{Router, routing::get};
//! use tollgate_axum::{GateLayer, RequireSession};
//! use tollgate_core::{GateConfig, SessionGate};
//!
//! async fn protected(session: RequireSession) -> String {
//!     format!("Hello, {}!", session.display_name)
//! }
//!
//! let gate = Arc::new(SessionGate::new(&GateConfig::from_env()?)?);
//! let app = Router::new()
//!     .route("/api/protected", get(protected))
//!     .layer(GateLayer::new(gate));
//! ```
//!
//! # Extractors
//!
//! - [`RequireSession`] - requires a validated session (denies if missing)
//! - [`MaybeSession`] - optional session (`None` if the route is not gated)

pub mod error;
pub mod extractors;
pub mod layer;
pub mod store;

pub use error::SessionRejection;
pub use extractors::{MaybeSession, RequireSession, SessionContext};
pub use layer::{GateLayer, GateService};
pub use store::{InMemorySessionStore, SessionStore};
