//! Denial response shaping.
//!
//! Every failed request - missing token, invalid token, fingerprint
//! mismatch, missing session context - receives the exact same response:
//! HTTP 401 with the fixed `4007` JSON body. Failure reasons are logged
//! where they are detected, never encoded in the response.

use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use tollgate_core::DenialBody;

/// The fixed denial response emitted for every rejected request.
pub(crate) fn denial_response() -> Response<Body> {
    let body = serde_json::to_string(&DenialBody::not_logged_in())
        .expect("denial body serializes to JSON");
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
        .body(Body::from(body))
        .expect("static denial response is valid")
}

/// Rejection for session extractors used on routes without a validated
/// session. Produces the same fixed denial response as the middleware.
#[derive(Debug)]
pub struct SessionRejection;

impl IntoResponse for SessionRejection {
    fn into_response(self) -> axum::response::Response {
        denial_response()
    }
}
