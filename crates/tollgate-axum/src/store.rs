//! Session store collaborator.
//!
//! On every allowed request the recovered identity is bound into an
//! external key-value store under [`SESSION_IDENTITY_KEY`] so downstream
//! handlers can pick it up. The store itself is out of scope here; this is
//! only the seam.
//!
//! [`SESSION_IDENTITY_KEY`]: tollgate_core::SESSION_IDENTITY_KEY

use std::collections::HashMap;
use std::sync::RwLock;

/// External key-value collaborator the gate binds identities into.
pub trait SessionStore: Send + Sync + 'static {
    /// Bind an identity under the given key for the current session scope.
    fn bind(&self, key: &str, identity: &str);
}

/// In-memory store for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read back a bound identity.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }
}

impl SessionStore for InMemorySessionStore {
    fn bind(&self, key: &str, identity: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), identity.to_string());
        }
    }
}
