//! Tower middleware layer running the session gate.
//!
//! The idiomatic counterpart of a framework login interceptor: every
//! request passes through [`GateService`], which extracts the token and
//! fingerprint headers, asks the gate for a decision, and either
//! short-circuits with the fixed denial payload or forwards the request
//! with the session context attached. On the way back out the refreshed
//! token is stamped into the response `user-token` header so clients can
//! keep sliding their expiry window.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use axum::body::Body;
use axum::http::{HeaderValue, Request, Response};
use pin_project_lite::pin_project;
use tower::{Layer, Service};

use tollgate_core::{
    Decision, SessionGate, FINGERPRINT_HEADER, SESSION_IDENTITY_KEY, TOKEN_HEADER,
};

use crate::error::denial_response;
use crate::extractors::{SessionContext, SessionContextExt};
use crate::store::SessionStore;

/// Tower layer that gates requests behind a session token.
#[derive(Clone)]
pub struct GateLayer {
    gate: Arc<SessionGate>,
    store: Option<Arc<dyn SessionStore>>,
}

impl GateLayer {
    /// Create a new gate layer.
    #[must_use]
    pub fn new(gate: Arc<SessionGate>) -> Self {
        Self { gate, store: None }
    }

    /// Attach a session store; allowed identities are bound into it under
    /// [`SESSION_IDENTITY_KEY`].
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }
}

impl<S> Layer<S> for GateLayer {
    type Service = GateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GateService {
            inner,
            gate: self.gate.clone(),
            store: self.store.clone(),
        }
    }
}

/// The session-gating service.
#[derive(Clone)]
pub struct GateService<S> {
    inner: S,
    gate: Arc<SessionGate>,
    store: Option<Arc<dyn SessionStore>>,
}

fn header_str<'a>(req: &'a Request<Body>, name: &'static str) -> Option<&'a str> {
    req.headers().get(name).and_then(|value| value.to_str().ok())
}

impl<S> Service<Request<Body>> for GateService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = GateFuture<S>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let token = header_str(&req, TOKEN_HEADER);
        let fingerprint = header_str(&req, FINGERPRINT_HEADER);

        let session = match self.gate.authorize(token, fingerprint) {
            Decision::Allow(session) => session,
            Decision::Deny(reason) => {
                tracing::debug!(?reason, "request denied at the gate");
                return GateFuture {
                    state: State::Denied,
                };
            }
        };

        if let Some(store) = &self.store {
            store.bind(SESSION_IDENTITY_KEY, &session.identity);
        }

        // A freshly issued compact token is always a valid header value.
        let refreshed = HeaderValue::from_str(&session.refreshed_token).ok();

        req.extensions_mut().insert(SessionContextExt(SessionContext {
            identity: session.identity,
            display_name: session.display_name,
            fingerprint: session.fingerprint,
        }));

        // Swap out the ready inner service (standard Tower clone dance).
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        GateFuture {
            state: State::Calling {
                future: inner.call(req),
                refreshed,
            },
        }
    }
}

pin_project! {
    /// Response future for [`GateService`].
    pub struct GateFuture<S>
    where
        S: Service<Request<Body>, Response = Response<Body>>,
    {
        #[pin]
        state: State<S>,
    }
}

pin_project! {
    #[project = StateProj]
    enum State<S>
    where
        S: Service<Request<Body>, Response = Response<Body>>,
    {
        Denied,
        Calling {
            #[pin]
            future: S::Future,
            refreshed: Option<HeaderValue>,
        },
    }
}

impl<S> Future for GateFuture<S>
where
    S: Service<Request<Body>, Response = Response<Body>>,
{
    type Output = Result<Response<Body>, S::Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        match this.state.project() {
            StateProj::Denied => Poll::Ready(Ok(denial_response())),
            StateProj::Calling { future, refreshed } => {
                let mut response = ready!(future.poll(cx))?;
                if let Some(value) = refreshed.take() {
                    response.headers_mut().insert(TOKEN_HEADER, value);
                }
                Poll::Ready(Ok(response))
            }
        }
    }
}
