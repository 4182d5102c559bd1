//! End-to-end middleware tests: a gated router driven with `oneshot`.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http_body_util::BodyExt;
use tower::ServiceExt;

use tollgate_axum::{GateLayer, InMemorySessionStore, MaybeSession, RequireSession};
use tollgate_core::{
    GateConfig, SessionGate, FINGERPRINT_HEADER, SESSION_IDENTITY_KEY, TOKEN_HEADER,
};

fn gate() -> Arc<SessionGate> {
    let secret = STANDARD.encode("0123456789abcdef0123456789abcdef");
    Arc::new(SessionGate::new(&GateConfig::new("test-passphrase", secret)).unwrap())
}

async fn whoami(session: RequireSession) -> String {
    session.identity.clone()
}

fn protected_app(gate: Arc<SessionGate>, store: Arc<InMemorySessionStore>) -> Router {
    Router::new()
        .route("/protected", get(whoami))
        .layer(GateLayer::new(gate).with_store(store))
}

fn request(token: Option<&str>, fingerprint: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .uri("/protected")
        .header(FINGERPRINT_HEADER, fingerprint);
    if let Some(token) = token {
        builder = builder.header(TOKEN_HEADER, token);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn allow_with_matching_fingerprint() {
    let gate = gate();
    let store = Arc::new(InMemorySessionStore::new());
    let token = gate
        .codec()
        .issue("123", "Judy", "UA-X", &BTreeMap::new())
        .unwrap();

    let response = protected_app(gate.clone(), store.clone())
        .oneshot(request(Some(&token), "UA-X"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // Refreshed token travels back in the same header and is itself valid
    let refreshed = response
        .headers()
        .get(TOKEN_HEADER)
        .expect("response carries a refreshed token")
        .to_str()
        .unwrap()
        .to_string();
    assert!(gate.codec().parse(&refreshed).is_ok());

    // Identity was bound into the session store and handed to the handler
    assert_eq!(store.get(SESSION_IDENTITY_KEY), Some("123".to_string()));
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"123");
}

#[tokio::test]
async fn deny_on_fingerprint_mismatch() {
    let gate = gate();
    let store = Arc::new(InMemorySessionStore::new());
    let token = gate
        .codec()
        .issue("123", "Judy", "UA-X", &BTreeMap::new())
        .unwrap();

    let response = protected_app(gate, store.clone())
        .oneshot(request(Some(&token), "UA-Y"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(TOKEN_HEADER).is_none());
    assert_eq!(store.get(SESSION_IDENTITY_KEY), None);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["code"], "4007");
    assert_eq!(json["msg"], "not logged in");
}

#[tokio::test]
async fn deny_on_missing_token() {
    let response = protected_app(gate(), Arc::new(InMemorySessionStore::new()))
        .oneshot(request(None, "UA-X"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["code"], "4007");
}

#[tokio::test]
async fn deny_on_garbage_token_matches_missing_token_payload() {
    // Uniform denial: a bad token and no token at all are
    // indistinguishable from outside
    let app = protected_app(gate(), Arc::new(InMemorySessionStore::new()));

    let garbage = app
        .clone()
        .oneshot(request(Some("not.a.token"), "UA-X"))
        .await
        .unwrap();
    let missing = app.oneshot(request(None, "UA-X")).await.unwrap();

    assert_eq!(garbage.status(), missing.status());
    let garbage_json = body_json(garbage.into_body()).await;
    let missing_json = body_json(missing.into_body()).await;
    assert_eq!(garbage_json, missing_json);
}

#[tokio::test]
async fn maybe_session_on_ungated_route() {
    async fn greet(session: MaybeSession) -> String {
        match session.0 {
            Some(ctx) => format!("hello {}", ctx.display_name),
            None => "hello guest".to_string(),
        }
    }

    let app = Router::new().route("/open", get(greet));
    let response = app
        .oneshot(Request::builder().uri("/open").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"hello guest");
}
